//! Textract AnalyzeDocument response parsing
//!
//! Only WORD blocks are kept. Every other block type (PAGE, LINE, TABLE, ...)
//! is skipped without inspecting its fields.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::annotation::{NormalizedPoint, Polygon, WordAnnotation};
use crate::error::DocumentError;

const WORD_BLOCK: &str = "WORD";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDocument {
    blocks: Option<Vec<RawBlock>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawBlock {
    block_type: Option<String>,
    id: Option<String>,
    text: Option<String>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawGeometry {
    polygon: Option<Vec<RawPoint>>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
}

/// Parse a Textract JSON response into word annotations, in document order
pub fn parse_document(json: &str) -> Result<Vec<WordAnnotation>, DocumentError> {
    let raw: RawDocument = serde_json::from_str(json)?;
    let blocks = raw.blocks.ok_or_else(DocumentError::missing_blocks)?;
    let total = blocks.len();

    let words = blocks
        .into_iter()
        .enumerate()
        .filter(|(_, block)| block.block_type.as_deref() == Some(WORD_BLOCK))
        .map(|(index, block)| word_from_block(index, block))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} word blocks out of {} blocks", words.len(), total);
    Ok(words)
}

/// Read and parse a Textract JSON response from disk
pub fn load_document(path: &Path) -> Result<Vec<WordAnnotation>, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content)
}

fn word_from_block(index: usize, block: RawBlock) -> Result<WordAnnotation, DocumentError> {
    let label = block.id.clone().unwrap_or_else(|| format!("#{}", index));
    let missing = |field| DocumentError::MissingAnnotationData {
        field,
        block: label.clone(),
    };

    let text = block.text.ok_or_else(|| missing("Text"))?;
    let geometry = block.geometry.ok_or_else(|| missing("Geometry"))?;
    let points = geometry.polygon.ok_or_else(|| missing("Geometry.Polygon"))?;

    let corners: [RawPoint; 4] =
        points
            .try_into()
            .map_err(|points: Vec<RawPoint>| DocumentError::PolygonPointCount {
                block: label.clone(),
                count: points.len(),
            })?;
    let [bl, br, tr, tl] = corners.map(|p| NormalizedPoint::new(p.x, p.y));

    Ok(WordAnnotation {
        id: block.id,
        text,
        polygon: Polygon::new(bl, br, tr, tl),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "Blocks": [
            { "BlockType": "PAGE", "Id": "p1" },
            { "BlockType": "LINE", "Id": "l1", "Text": "Hello world" },
            {
                "BlockType": "WORD", "Id": "w1", "Text": "Hello", "Confidence": 99.1,
                "Geometry": { "Polygon": [
                    {"X": 0.10, "Y": 0.20}, {"X": 0.30, "Y": 0.20},
                    {"X": 0.30, "Y": 0.25}, {"X": 0.10, "Y": 0.25}
                ] }
            },
            {
                "BlockType": "WORD", "Id": "w2", "Text": "world",
                "Geometry": { "Polygon": [
                    {"X": 0.35, "Y": 0.20}, {"X": 0.55, "Y": 0.20},
                    {"X": 0.55, "Y": 0.25}, {"X": 0.35, "Y": 0.25}
                ] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_only_words_in_order() {
        let words = parse_document(SAMPLE).unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].id.as_deref(), Some("w1"));
        assert_eq!(words[1].text, "world");
        assert!((words[0].polygon.top_right().x - 0.30).abs() < 1e-9);
        assert!((words[0].polygon.top_left().y - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_missing_blocks_is_document_error() {
        let result = parse_document(r#"{ "DocumentMetadata": { "Pages": 1 } }"#);
        assert!(matches!(
            result,
            Err(DocumentError::MissingAnnotationData { field: "Blocks", .. })
        ));
    }

    #[test]
    fn test_word_without_text() {
        let json = r#"{ "Blocks": [ { "BlockType": "WORD", "Id": "w9",
            "Geometry": { "Polygon": [] } } ] }"#;

        match parse_document(json) {
            Err(DocumentError::MissingAnnotationData { field, block }) => {
                assert_eq!(field, "Text");
                assert_eq!(block, "w9");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_word_without_geometry() {
        let json = r#"{ "Blocks": [ { "BlockType": "WORD", "Text": "hi" } ] }"#;

        match parse_document(json) {
            Err(DocumentError::MissingAnnotationData { field, block }) => {
                assert_eq!(field, "Geometry");
                assert_eq!(block, "#0");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_polygon_point_count() {
        let json = r#"{ "Blocks": [ { "BlockType": "WORD", "Id": "w1", "Text": "hi",
            "Geometry": { "Polygon": [ {"X": 0.1, "Y": 0.1}, {"X": 0.2, "Y": 0.1} ] } } ] }"#;

        assert!(matches!(
            parse_document(json),
            Err(DocumentError::PolygonPointCount { count: 2, .. })
        ));
    }

    #[test]
    fn test_non_word_blocks_need_no_fields() {
        let json = r#"{ "Blocks": [ { "BlockType": "LINE" }, { } ] }"#;
        assert!(parse_document(json).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_document("not json"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn test_load_document_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", SAMPLE).unwrap();

        let words = load_document(temp_file.path()).unwrap();
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/path/response.json"));
        assert!(matches!(result, Err(DocumentError::Read { .. })));
    }
}
