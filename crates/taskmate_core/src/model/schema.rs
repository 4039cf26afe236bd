//! Decode-boundary errors and field readers.

use crate::collab::{Collection, Document, DocumentId};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssue {
    Missing,
    WrongType { expected: &'static str },
    Invalid(String),
}

/// A stored document does not have the shape its collection promises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub collection: Collection,
    pub id: DocumentId,
    pub field: &'static str,
    pub issue: SchemaIssue,
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let location = format!("{}/{} field `{}`", self.collection.name(), self.id, self.field);
        match &self.issue {
            SchemaIssue::Missing => write!(f, "{location} is missing"),
            SchemaIssue::WrongType { expected } => write!(f, "{location} is not a {expected}"),
            SchemaIssue::Invalid(details) => write!(f, "{location} is invalid: {details}"),
        }
    }
}

impl Error for SchemaError {}

/// Typed accessors over one document's fields.
pub(crate) struct FieldReader<'a> {
    collection: Collection,
    doc: &'a Document,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(collection: Collection, doc: &'a Document) -> Self {
        Self { collection, doc }
    }

    pub(crate) fn error(&self, field: &'static str, issue: SchemaIssue) -> SchemaError {
        SchemaError {
            collection: self.collection,
            id: self.doc.id.clone(),
            field,
            issue,
        }
    }

    fn value(&self, field: &str) -> Option<&'a Value> {
        self.doc.fields.get(field).filter(|value| !value.is_null())
    }

    pub(crate) fn optional_str(&self, field: &'static str) -> Result<Option<&'a str>, SchemaError> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(self.error(field, SchemaIssue::WrongType { expected: "string" })),
        }
    }

    pub(crate) fn required_str(&self, field: &'static str) -> Result<&'a str, SchemaError> {
        self.optional_str(field)?
            .ok_or_else(|| self.error(field, SchemaIssue::Missing))
    }

    /// Required string that is not blank.
    pub(crate) fn required_text(&self, field: &'static str) -> Result<&'a str, SchemaError> {
        let value = self.required_str(field)?;
        if value.trim().is_empty() {
            return Err(self.error(field, SchemaIssue::Invalid("must not be empty".to_string())));
        }
        Ok(value)
    }

    pub(crate) fn optional_bool(&self, field: &'static str) -> Result<Option<bool>, SchemaError> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(self.error(field, SchemaIssue::WrongType { expected: "boolean" })),
        }
    }

    /// Non-negative integer. Whole-valued floats are accepted as well.
    pub(crate) fn optional_count(&self, field: &'static str) -> Result<Option<u32>, SchemaError> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Number(number)) => number
                .as_u64()
                .or_else(|| {
                    number
                        .as_f64()
                        .filter(|value| *value >= 0.0 && value.fract() == 0.0)
                        .map(|value| value as u64)
                })
                .and_then(|value| u32::try_from(value).ok())
                .map(Some)
                .ok_or_else(|| {
                    self.error(field, SchemaIssue::Invalid(format!("not a count `{number}`")))
                }),
            Some(_) => Err(self.error(field, SchemaIssue::WrongType { expected: "number" })),
        }
    }

    /// Runs `parse` over a raw string, mapping failures to `SchemaIssue::Invalid`.
    pub(crate) fn parse<T>(
        &self,
        field: &'static str,
        raw: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, SchemaError> {
        parse(raw).ok_or_else(|| {
            self.error(field, SchemaIssue::Invalid(format!("unparseable value `{raw}`")))
        })
    }
}
