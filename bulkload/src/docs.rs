//! Document sources and normalization.
//!
//! A dataset arrives either as raw text lines (newline-delimited JSON) or as
//! already-structured records. The source declares its kind upfront via
//! [`DocSource`], so no sampling or rewinding of the stream is needed; each
//! record is then normalized into a fully qualified [`BulkDoc`].

use std::io::{self, BufRead};

use serde_json::Value;

use crate::errors::LoadError;
use bulkload_repository::BulkDoc;

/// A finite, single-pass sequence of documents to index.
///
/// Beside the user defined fields, a document may carry `_index`, `_type`
/// and `_id`; `_index` and `_type` default to the run's configuration when
/// absent.
pub enum DocSource {
    /// Lines of JSON text, one document per line.
    Text(Box<dyn Iterator<Item = io::Result<String>> + Send>),
    /// Already-parsed JSON records.
    Structured(Box<dyn Iterator<Item = Value> + Send>),
}

impl DocSource {
    /// Build a text source from an iterator of lines.
    pub fn text<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        DocSource::Text(Box::new(lines.into_iter().map(Ok)))
    }

    /// Build a structured source from an iterator of records.
    pub fn structured<I>(docs: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        DocSource::Structured(Box::new(docs.into_iter()))
    }

    /// Build a text source from a line-oriented byte stream, the shape the
    /// orchestrator hands over for file-backed inputs.
    pub fn from_lines<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        DocSource::Text(Box::new(reader.lines()))
    }
}

/// Normalize a source into fully qualified documents.
///
/// Text entries are parsed as JSON first. Every record must be a JSON
/// object; `_index`/`_type` are injected from the run configuration when the
/// record doesn't already specify them, and an explicit `_id` is honored.
/// The metadata fields are stripped from the body.
pub(crate) fn normalize(
    source: DocSource,
    default_index: &str,
    default_doc_type: &str,
) -> Box<dyn Iterator<Item = Result<BulkDoc, LoadError>> + Send> {
    let default_index = default_index.to_string();
    let default_doc_type = default_doc_type.to_string();

    match source {
        DocSource::Text(lines) => Box::new(lines.map(move |line| {
            let line = line?;
            let value: Value = serde_json::from_str(&line)
                .map_err(|e| LoadError::parse(format!("invalid JSON document: {}", e)))?;
            qualify(value, &default_index, &default_doc_type)
        })),
        DocSource::Structured(records) => Box::new(
            records.map(move |value| qualify(value, &default_index, &default_doc_type)),
        ),
    }
}

/// Split the routing metadata off one record.
fn qualify(value: Value, default_index: &str, default_doc_type: &str) -> Result<BulkDoc, LoadError> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(LoadError::parse(format!(
                "document must be a JSON object, got: {}",
                other
            )))
        }
    };

    let index = match fields.remove("_index") {
        Some(Value::String(index)) => index,
        Some(other) => {
            return Err(LoadError::parse(format!(
                "_index must be a string, got: {}",
                other
            )))
        }
        None => default_index.to_string(),
    };

    let doc_type = match fields.remove("_type") {
        Some(Value::String(doc_type)) => doc_type,
        Some(other) => {
            return Err(LoadError::parse(format!(
                "_type must be a string, got: {}",
                other
            )))
        }
        None => default_doc_type.to_string(),
    };

    let id = match fields.remove("_id") {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        Some(other) => {
            return Err(LoadError::parse(format!(
                "_id must be a string or number, got: {}",
                other
            )))
        }
        None => None,
    };

    Ok(BulkDoc {
        index,
        doc_type,
        id,
        source: Value::Object(fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn collect(source: DocSource) -> Vec<Result<BulkDoc, LoadError>> {
        normalize(source, "articles", "default").collect()
    }

    #[test]
    fn test_defaults_injected_when_absent() {
        let source = DocSource::structured(vec![json!({"title": "An example document."})]);

        let docs = collect(source);
        let doc = docs[0].as_ref().unwrap();

        assert_eq!(doc.index, "articles");
        assert_eq!(doc.doc_type, "default");
        assert!(doc.id.is_none());
        assert_eq!(doc.source, json!({"title": "An example document."}));
    }

    #[test]
    fn test_explicit_metadata_preserved() {
        let source = DocSource::structured(vec![json!({
            "_index": "other",
            "_type": "special",
            "_id": "42",
            "title": "t"
        })]);

        let docs = collect(source);
        let doc = docs[0].as_ref().unwrap();

        assert_eq!(doc.index, "other");
        assert_eq!(doc.doc_type, "special");
        assert_eq!(doc.id.as_deref(), Some("42"));
        assert_eq!(doc.source, json!({"title": "t"}));
    }

    #[test]
    fn test_numeric_id_coerced() {
        let source = DocSource::structured(vec![json!({"_id": 1, "title": "t"})]);

        let docs = collect(source);
        let doc = docs[0].as_ref().unwrap();

        assert_eq!(doc.id.as_deref(), Some("1"));
    }

    #[test]
    fn test_text_lines_parsed() {
        let source = DocSource::text(vec![
            r#"{"title": "first"}"#.to_string(),
            r#"{"_index": "other", "title": "second"}"#.to_string(),
        ]);

        let docs = collect(source);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].as_ref().unwrap().index, "articles");
        assert_eq!(docs[1].as_ref().unwrap().index, "other");
    }

    #[test]
    fn test_invalid_json_line_is_error() {
        let source = DocSource::text(vec!["not json".to_string()]);

        let docs = collect(source);

        assert!(matches!(docs[0], Err(LoadError::ParseError(_))));
    }

    #[test]
    fn test_non_object_record_is_error() {
        let source = DocSource::structured(vec![json!([1, 2, 3])]);

        let docs = collect(source);

        assert!(matches!(docs[0], Err(LoadError::ParseError(_))));
    }

    #[test]
    fn test_from_lines_reads_ldj() {
        let data = "{\"title\": \"a\"}\n{\"title\": \"b\"}\n";
        let source = DocSource::from_lines(Cursor::new(data.to_string()));

        let docs = collect(source);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].as_ref().unwrap().source, json!({"title": "b"}));
    }
}
