use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::parser::narrative::Narrative;
use crate::parser::tables::TableData;

/// Provenance of the survey form itself (who recorded it, when).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    RecordedBy,
    Organization,
    Date,
}

impl Metadata {
    /// Absent and empty read the same.
    pub fn get(&self, field: MetadataField) -> &str {
        self.slot(field).as_deref().unwrap_or("")
    }

    pub fn set(&mut self, field: MetadataField, value: String) {
        *self.slot_mut(field) = Some(value);
    }

    fn slot(&self, field: MetadataField) -> &Option<String> {
        match field {
            MetadataField::RecordedBy => &self.recorded_by,
            MetadataField::Organization => &self.organization,
            MetadataField::Date => &self.date,
        }
    }

    fn slot_mut(&mut self, field: MetadataField) -> &mut Option<String> {
        match field {
            MetadataField::RecordedBy => &mut self.recorded_by,
            MetadataField::Organization => &mut self.organization,
            MetadataField::Date => &mut self.date,
        }
    }
}

/// Facts about the property. Every key is optional and free-form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessors_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usgs_quad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architect_builder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbuildings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_alterations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acreage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    AssessorsNumber,
    UsgsQuad,
    Area,
    FormNumber,
    TownCity,
    Place,
    Address,
    HistoricName,
    Uses,
    ConstructionDate,
    Source,
    StyleForm,
    ArchitectBuilder,
    ExteriorMaterial,
    Outbuildings,
    MajorAlterations,
    Condition,
    Moved,
    Acreage,
    Setting,
}

impl PropertyInfo {
    /// Absent and empty read the same.
    pub fn get(&self, field: PropertyField) -> &str {
        self.slot(field).as_deref().unwrap_or("")
    }

    pub fn set(&mut self, field: PropertyField, value: String) {
        *self.slot_mut(field) = Some(value);
    }

    fn slot(&self, field: PropertyField) -> &Option<String> {
        use PropertyField::*;
        match field {
            AssessorsNumber => &self.assessors_number,
            UsgsQuad => &self.usgs_quad,
            Area => &self.area,
            FormNumber => &self.form_number,
            TownCity => &self.town_city,
            Place => &self.place,
            Address => &self.address,
            HistoricName => &self.historic_name,
            Uses => &self.uses,
            ConstructionDate => &self.construction_date,
            Source => &self.source,
            StyleForm => &self.style_form,
            ArchitectBuilder => &self.architect_builder,
            ExteriorMaterial => &self.exterior_material,
            Outbuildings => &self.outbuildings,
            MajorAlterations => &self.major_alterations,
            Condition => &self.condition,
            Moved => &self.moved,
            Acreage => &self.acreage,
            Setting => &self.setting,
        }
    }

    fn slot_mut(&mut self, field: PropertyField) -> &mut Option<String> {
        use PropertyField::*;
        match field {
            AssessorsNumber => &mut self.assessors_number,
            UsgsQuad => &mut self.usgs_quad,
            Area => &mut self.area,
            FormNumber => &mut self.form_number,
            TownCity => &mut self.town_city,
            Place => &mut self.place,
            Address => &mut self.address,
            HistoricName => &mut self.historic_name,
            Uses => &mut self.uses,
            ConstructionDate => &mut self.construction_date,
            Source => &mut self.source,
            StyleForm => &mut self.style_form,
            ArchitectBuilder => &mut self.architect_builder,
            ExteriorMaterial => &mut self.exterior_material,
            Outbuildings => &mut self.outbuildings,
            MajorAlterations => &mut self.major_alterations,
            Condition => &mut self.condition,
            Moved => &mut self.moved,
            Acreage => &mut self.acreage,
            Setting => &mut self.setting,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub style: String,
}

/// One normalized historic-property document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyRecord {
    #[serde(rename = "filename")]
    pub identifier: String,
    #[serde(rename = "file_path")]
    pub source_path: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub property_info: PropertyInfo,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub architectural_description: String,
    #[serde(default)]
    pub historical_narrative: String,
    #[serde(default)]
    pub bibliography: String,
}

/// Records in processing order. Repeated identifiers are kept, not merged.
pub type PropertyCollection = Vec<PropertyRecord>;

impl PropertyRecord {
    /// Structural merge of the per-document stage outputs. Each field has
    /// exactly one upstream source, so nothing can collide.
    pub fn assemble(
        identifier: String,
        source_path: String,
        tables: TableData,
        narrative: Narrative,
    ) -> Self {
        Self {
            identifier,
            source_path,
            metadata: tables.metadata,
            property_info: tables.property_info,
            images: tables.images,
            architectural_description: narrative.architectural_description,
            historical_narrative: narrative.historical_narrative,
            bibliography: narrative.bibliography,
        }
    }

    /// Structural invariants that the type system does not already enforce.
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.identifier.trim().is_empty() {
            out.push(format!("record from {:?} has an empty identifier", self.source_path));
        }
        for (i, image) in self.images.iter().enumerate() {
            if image.src.is_empty() {
                out.push(format!("{}: image #{} has an empty src", self.identifier, i));
            }
        }
        out
    }
}

/// Base file name without its extension.
pub fn identifier_from_path(path: &Path) -> Result<String, LoadError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LoadError::NoIdentifier {
            path: path.to_path_buf(),
        })
}
