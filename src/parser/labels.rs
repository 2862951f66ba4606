//! Literal label text found in the survey-form tables and the record field
//! each one fills. These slices are the only place the known key set lives.

use crate::record::{MetadataField, PropertyField};

/// First-cell marker that identifies the metadata table.
pub const METADATA_MARKER: &str = "Recorded by:";

/// First-cell marker that identifies the property-info table.
pub const PROPERTY_MARKER: &str = "Town/City:";

pub const METADATA_LABELS: &[(&str, MetadataField)] = &[
    ("Recorded by:", MetadataField::RecordedBy),
    ("Organization:", MetadataField::Organization),
    ("Date:", MetadataField::Date),
];

pub const PROPERTY_LABELS: &[(&str, PropertyField)] = &[
    ("Town/City:", PropertyField::TownCity),
    ("Place:", PropertyField::Place),
    ("Address:", PropertyField::Address),
    ("Historic Name:", PropertyField::HistoricName),
    ("Uses:", PropertyField::Uses),
    ("Date of Construction:", PropertyField::ConstructionDate),
    ("Source:", PropertyField::Source),
    ("Style/Form:", PropertyField::StyleForm),
    ("Architect/Builder:", PropertyField::ArchitectBuilder),
    ("Exterior Material:", PropertyField::ExteriorMaterial),
    ("Outbuildings/Secondary Structures:", PropertyField::Outbuildings),
    ("Major Alterations:", PropertyField::MajorAlterations),
    ("Condition:", PropertyField::Condition),
    ("Moved:", PropertyField::Moved),
    ("Acreage:", PropertyField::Acreage),
    ("Setting:", PropertyField::Setting),
];

/// Positional cells of the single-row assessor table.
pub const ASSESSOR_COLUMNS: &[(usize, PropertyField)] = &[
    (0, PropertyField::AssessorsNumber),
    (2, PropertyField::UsgsQuad),
    (4, PropertyField::Area),
    (6, PropertyField::FormNumber),
];

/// Minimum row width for the assessor shape to be recognized at all.
pub const ASSESSOR_MIN_CELLS: usize = 3;

/// Row width needed before any assessor column is read.
pub const ASSESSOR_FULL_CELLS: usize = 7;

/// First label contained in `cell` and the cell with that label removed.
///
/// Matching is case-sensitive substring containment; the first entry of
/// `labels` that matches wins, so a row fills at most one field.
pub fn match_label<F: Copy>(cell: &str, labels: &[(&str, F)]) -> Option<(F, String)> {
    labels
        .iter()
        .find(|(label, _)| cell.contains(label))
        .map(|(label, field)| (*field, cell.replace(label, "").trim().to_string()))
}
