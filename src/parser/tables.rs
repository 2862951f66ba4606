use tracing::debug;

use super::clean_text;
use super::labels::{
    match_label, ASSESSOR_COLUMNS, ASSESSOR_FULL_CELLS, ASSESSOR_MIN_CELLS, METADATA_LABELS,
    METADATA_MARKER, PROPERTY_LABELS, PROPERTY_MARKER,
};
use crate::document::Node;
use crate::record::{Image, Metadata, PropertyInfo};

/// Everything the tables of one document contribute to its record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    pub metadata: Metadata,
    pub property_info: PropertyInfo,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// No rows, or no row with a cell.
    Empty,
    Image,
    Metadata,
    PropertyInfo,
    Assessor,
    /// Matched no known shape; contributes nothing.
    Unclassified,
}

/// Walk every table in document order and merge what each one yields.
/// A later table writing the same key overwrites the earlier value.
pub fn extract_tables(root: &Node) -> TableData {
    let mut data = TableData::default();
    for (index, table) in root.elements("table").enumerate() {
        let kind = extract_table(table, &mut data);
        debug!(table = index, ?kind, "classified table");
    }
    data
}

fn extract_table(table: &Node, data: &mut TableData) -> TableKind {
    if table.elements("tr").next().is_none() {
        return TableKind::Empty;
    }

    let images: Vec<&Node> = table.elements("img").collect();
    if !images.is_empty() {
        data.images.extend(images.into_iter().filter_map(image_ref));
        return TableKind::Image;
    }

    let rows = flatten_rows(table);
    let kind = classify(&rows);
    match kind {
        TableKind::Metadata => {
            for cell in rows.iter().filter_map(|r| r.first()) {
                if let Some((field, value)) = match_label(cell, METADATA_LABELS) {
                    data.metadata.set(field, value);
                }
            }
        }
        TableKind::PropertyInfo => {
            for cell in rows.iter().filter_map(|r| r.first()) {
                if let Some((field, value)) = match_label(cell, PROPERTY_LABELS) {
                    data.property_info.set(field, value);
                }
            }
        }
        TableKind::Assessor => {
            let row = &rows[0];
            if row.len() >= ASSESSOR_FULL_CELLS {
                for &(col, field) in ASSESSOR_COLUMNS {
                    data.property_info.set(field, row[col].clone());
                }
            }
        }
        TableKind::Empty | TableKind::Image | TableKind::Unclassified => {}
    }
    kind
}

fn image_ref(img: &Node) -> Option<Image> {
    let src = img.attr("src").filter(|s| !s.is_empty())?;
    Some(Image {
        src: src.to_string(),
        alt: img.attr("alt").unwrap_or_default().to_string(),
        style: img.attr("style").unwrap_or_default().to_string(),
    })
}

/// Cell texts of each row, rows without cells dropped.
pub fn flatten_rows(table: &Node) -> Vec<Vec<String>> {
    table
        .elements("tr")
        .map(|row| {
            row.descendants()
                .filter(|n| n.is_element("td") || n.is_element("th"))
                .map(|cell| clean_text(&cell.text()))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Decide a text table's shape from its first cell, then its dimensions.
/// Checks run in a fixed order and the first hit wins.
pub fn classify(rows: &[Vec<String>]) -> TableKind {
    let Some(first_cell) = rows.first().and_then(|r| r.first()) else {
        return TableKind::Empty;
    };

    if first_cell.contains(METADATA_MARKER) {
        TableKind::Metadata
    } else if first_cell.contains(PROPERTY_MARKER) {
        TableKind::PropertyInfo
    } else if rows.len() == 1 && rows[0].len() >= ASSESSOR_MIN_CELLS {
        TableKind::Assessor
    } else {
        TableKind::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::record::{MetadataField, PropertyField};

    fn tables(html: &str) -> TableData {
        extract_tables(Document::parse(html).root())
    }

    fn row_table(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!("<table><tr>{tds}</tr></table>")
    }

    #[test]
    fn metadata_table() {
        let data = tables(
            "<table>
               <tr><td>Recorded by: J. Smith</td></tr>
               <tr><td>Organization: Historical Commission</td></tr>
               <tr><td>Date: March, 2020</td></tr>
             </table>",
        );
        assert_eq!(data.metadata.get(MetadataField::RecordedBy), "J. Smith");
        assert_eq!(data.metadata.get(MetadataField::Organization), "Historical Commission");
        assert_eq!(data.metadata.get(MetadataField::Date), "March, 2020");
        assert_eq!(data.property_info, PropertyInfo::default());
    }

    #[test]
    fn metadata_label_without_row_stays_absent() {
        let data = tables("<table><tr><td>Recorded by: J. Smith</td></tr></table>");
        assert_eq!(data.metadata.organization, None);
        assert_eq!(data.metadata.date, None);
    }

    #[test]
    fn assessor_table_seven_cells() {
        let data = tables(&row_table(&[
            "12-34", "x", "Boston North", "y", "2.1 acres", "z", "F-007",
        ]));
        let info = &data.property_info;
        assert_eq!(info.get(PropertyField::AssessorsNumber), "12-34");
        assert_eq!(info.get(PropertyField::UsgsQuad), "Boston North");
        assert_eq!(info.get(PropertyField::Area), "2.1 acres");
        assert_eq!(info.get(PropertyField::FormNumber), "F-007");
    }

    #[test]
    fn assessor_shape_too_narrow_extracts_nothing() {
        let html = row_table(&["12-34", "x", "Boston North", "y", "2.1 acres"]);
        let doc = Document::parse(&html);
        let table = doc.root().elements("table").next().unwrap();
        assert_eq!(classify(&flatten_rows(table)), TableKind::Assessor);
        assert_eq!(tables(&html).property_info, PropertyInfo::default());
    }

    #[test]
    fn two_row_table_is_not_assessor() {
        let data = tables(
            "<table><tr><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td><td>f</td><td>g</td></tr>
                    <tr><td>h</td></tr></table>",
        );
        assert_eq!(data, TableData::default());
    }

    #[test]
    fn property_info_table() {
        let data = tables(
            "<table>
               <tr><td>Town/City: Medford</td></tr>
               <tr><td>Place: (neighborhood or village) Hillside</td></tr>
               <tr><td>Address: 17 Hillside Ave</td></tr>
               <tr><td>Historic Name: Joseph Wyman House</td></tr>
               <tr><td>Date of Construction: c. 1885</td></tr>
               <tr><td>Style/Form: Queen Anne</td></tr>
               <tr><td>Outbuildings/Secondary Structures: Garage</td></tr>
               <tr><td>Condition: Good</td></tr>
               <tr><td>Roof Material: Slate</td></tr>
             </table>",
        );
        let info = &data.property_info;
        assert_eq!(info.get(PropertyField::TownCity), "Medford");
        assert_eq!(info.get(PropertyField::Place), "(neighborhood or village) Hillside");
        assert_eq!(info.get(PropertyField::Address), "17 Hillside Ave");
        assert_eq!(info.get(PropertyField::HistoricName), "Joseph Wyman House");
        assert_eq!(info.get(PropertyField::ConstructionDate), "c. 1885");
        assert_eq!(info.get(PropertyField::StyleForm), "Queen Anne");
        assert_eq!(info.get(PropertyField::Outbuildings), "Garage");
        assert_eq!(info.get(PropertyField::Condition), "Good");
        assert_eq!(info.moved, None);
    }

    #[test]
    fn property_rows_matched_in_any_order() {
        let data = tables(
            "<table>
               <tr><td>Town/City: Medford</td></tr>
               <tr><td>Setting: Residential</td></tr>
               <tr><td>Acreage: 0.2</td></tr>
               <tr><td>Uses: Single family</td></tr>
             </table>",
        );
        assert_eq!(data.property_info.get(PropertyField::Setting), "Residential");
        assert_eq!(data.property_info.get(PropertyField::Acreage), "0.2");
        assert_eq!(data.property_info.get(PropertyField::Uses), "Single family");
    }

    #[test]
    fn metadata_marker_takes_priority() {
        let data = tables(
            "<table><tr><td>Recorded by: J. Smith Town/City: Medford</td></tr></table>",
        );
        assert_eq!(
            data.metadata.get(MetadataField::RecordedBy),
            "J. Smith Town/City: Medford"
        );
        assert_eq!(data.property_info.town_city, None);
    }

    #[test]
    fn only_first_cell_of_first_row_classifies() {
        let data = tables(
            "<table><tr><td>Form No.</td><td>Town/City: Medford</td></tr></table>",
        );
        assert_eq!(data, TableData::default());
    }

    #[test]
    fn image_table_collects_refs() {
        let data = tables(
            r#"<table><tr>
                 <td><img src="photo1.jpg" alt="Front" style="width:300px"></td>
                 <td><img src="" alt="blank"></td>
                 <td><img alt="no source"></td>
                 <td><img src="photo1.jpg"></td>
               </tr></table>"#,
        );
        assert_eq!(
            data.images,
            vec![
                Image {
                    src: "photo1.jpg".into(),
                    alt: "Front".into(),
                    style: "width:300px".into(),
                },
                Image {
                    src: "photo1.jpg".into(),
                    alt: String::new(),
                    style: String::new(),
                },
            ]
        );
    }

    #[test]
    fn image_table_skips_text_extraction() {
        let data = tables(
            r#"<table><tr><td>Town/City: Medford<img src="a.jpg"></td></tr></table>"#,
        );
        assert_eq!(data.images.len(), 1);
        assert_eq!(data.property_info.town_city, None);
    }

    #[test]
    fn cell_text_normalized() {
        let doc = Document::parse(
            "<table><tr><th> Address:&nbsp;&nbsp;17\n   Hillside <b>Ave</b> </th><td></td></tr>
                    <tr></tr></table>",
        );
        let table = doc.root().elements("table").next().unwrap();
        let rows = flatten_rows(table);
        assert_eq!(rows, vec![vec!["Address: 17 Hillside Ave".to_string(), String::new()]]);
    }

    #[test]
    fn empty_and_unshaped_tables_ignored() {
        assert_eq!(tables("<table></table>"), TableData::default());
        assert_eq!(tables("<table><tr></tr></table>"), TableData::default());
        assert_eq!(tables(&row_table(&["just", "two"])), TableData::default());
    }

    #[test]
    fn nested_tables_classified_independently() {
        let html = "<table>\
                      <tr><td>Town/City: Medford</td></tr>\
                      <tr><td><table><tr><td>Recorded by: J. Smith</td></tr></table></td></tr>\
                    </table>";
        let doc = Document::parse(html);
        let outer = doc.root().elements("table").next().unwrap();
        assert_eq!(
            flatten_rows(outer),
            vec![
                vec!["Town/City: Medford".to_string()],
                vec!["Recorded by: J. Smith".to_string(), "Recorded by: J. Smith".to_string()],
                vec!["Recorded by: J. Smith".to_string()],
            ]
        );

        let data = tables(html);
        assert_eq!(data.property_info.get(PropertyField::TownCity), "Medford");
        assert_eq!(data.metadata.get(MetadataField::RecordedBy), "J. Smith");
        assert_eq!(data.property_info.address, None);
    }

    #[test]
    fn later_tables_merge_and_overwrite() {
        let html = format!(
            "<table><tr><td>Town/City: Medford</td></tr><tr><td>Condition: Fair</td></tr></table>
             {}
             <table><tr><td>Town/City: Malden</td></tr></table>",
            row_table(&["12-34", "", "Boston North", "", "2.1 acres", "", "F-007"])
        );
        let data = tables(&html);
        assert_eq!(data.property_info.get(PropertyField::TownCity), "Malden");
        assert_eq!(data.property_info.get(PropertyField::Condition), "Fair");
        assert_eq!(data.property_info.get(PropertyField::FormNumber), "F-007");
    }
}
