use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::parser;
use crate::record::{identifier_from_path, MetadataField, PropertyCollection, PropertyField};
use crate::settings::Settings;

/// A document that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub identifier: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<Failure>,
}

impl BatchSummary {
    pub fn print(&self) {
        println!(
            "Extracted {} of {} documents ({} failed).",
            self.succeeded,
            self.attempted,
            self.failures.len()
        );
        for f in &self.failures {
            println!("  {}: {}", f.identifier, f.message);
        }
    }
}

/// Source documents in `dir`, sorted by file name.
///
/// Only regular files with one of `settings.extensions` count; the reserved
/// stem (the site index page) is skipped. Subdirectories are not searched.
pub fn discover(dir: &Path, settings: &Settings) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let wanted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| settings.extensions.iter().any(|w| w.eq_ignore_ascii_case(ext)));
        let reserved = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.eq_ignore_ascii_case(&settings.reserved_stem));
        if wanted && !reserved {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Extract every document, `chunk_size` at a time across the rayon pool.
///
/// Records come back in input order. A document that fails to load is
/// logged and counted; it never stops the others.
pub fn run(paths: &[PathBuf], chunk_size: usize) -> (PropertyCollection, BatchSummary) {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut collection = PropertyCollection::with_capacity(paths.len());
    let mut summary = BatchSummary {
        attempted: paths.len(),
        ..Default::default()
    };

    for chunk in paths.chunks(chunk_size.max(1)) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|path| (path, parser::process_document(path)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(record) => {
                    debug!(
                        identifier = %record.identifier,
                        address = record.property_info.get(PropertyField::Address),
                        recorded_by = record.metadata.get(MetadataField::RecordedBy),
                        images = record.images.len(),
                        "extracted document"
                    );
                    summary.succeeded += 1;
                    collection.push(record);
                }
                Err(e) => {
                    let identifier = identifier_from_path(path)
                        .unwrap_or_else(|_| path.display().to_string());
                    warn!(%identifier, error = %e, "skipping document");
                    summary.failures.push(Failure {
                        identifier,
                        message: e.to_string(),
                    });
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failures.len(),
        "batch finished"
    );
    (collection, summary)
}
