use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ArtifactError, SerializationError};
use crate::record::{PropertyCollection, PropertyRecord};

/// Artifacts written to temporaries next to their targets, swapped in only
/// on [`Publisher::commit`]. Dropping an uncommitted publisher removes the
/// temporaries and leaves every existing artifact as it was.
pub struct Publisher {
    dir: PathBuf,
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl Publisher {
    pub fn new(dir: &Path) -> Result<Self, SerializationError> {
        std::fs::create_dir_all(dir).map_err(|source| SerializationError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            staged: Vec::new(),
        })
    }

    /// Serialize `value` as pretty JSON into a temporary destined for `name`.
    pub fn stage<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<(), SerializationError> {
        let target = self.dir.join(name);
        let stage_err = |source| SerializationError::Stage {
            path: target.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.dir).map_err(stage_err)?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
                SerializationError::Encode {
                    path: target.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(stage_err)?;
        }
        file.as_file().sync_all().map_err(stage_err)?;

        debug!(target = %target.display(), "staged artifact");
        self.staged.push((file, target));
        Ok(())
    }

    /// Replace every target in staging order. Returns the paths written.
    ///
    /// All targets are checked before the first one is replaced, so a target
    /// that cannot be overwritten aborts the commit with nothing moved.
    pub fn commit(self) -> Result<Vec<PathBuf>, SerializationError> {
        for (_, target) in &self.staged {
            let blocked = std::fs::symlink_metadata(target).is_ok_and(|meta| meta.is_dir());
            if blocked {
                return Err(SerializationError::Blocked {
                    path: target.clone(),
                });
            }
        }

        let mut written = Vec::with_capacity(self.staged.len());
        for (file, target) in self.staged {
            file.persist(&target)
                .map_err(|source| SerializationError::Persist {
                    path: target.clone(),
                    source,
                })?;
            written.push(target);
        }
        Ok(written)
    }
}

/// Publish the combined collection and, optionally, one file per record.
///
/// Everything is staged before anything is replaced; per-record files are
/// swapped in first and the combined file last.
pub fn publish(
    collection: &[PropertyRecord],
    output_dir: &Path,
    combined_file: &str,
    write_individual: bool,
) -> Result<Vec<PathBuf>, SerializationError> {
    let mut publisher = Publisher::new(output_dir)?;

    if write_individual {
        for record in collection {
            let name = individual_file_name(&record.identifier);
            if name == combined_file {
                warn!(
                    identifier = %record.identifier,
                    "record file would overwrite the combined artifact, skipping it"
                );
                continue;
            }
            publisher.stage(&name, record)?;
        }
    }
    publisher.stage(combined_file, collection)?;

    publisher.commit()
}

pub fn individual_file_name(identifier: &str) -> String {
    format!("{}.json", identifier)
}

/// Read a combined artifact back, including hand-edited ones that follow the
/// record schema.
pub fn load_collection(path: &Path) -> Result<PropertyCollection, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
