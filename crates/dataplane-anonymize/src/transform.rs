use std::borrow::Cow;

use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::TransformError;
use crate::model::BuildingRecord;

/// Trustee whose records are anonymized when nothing else is configured.
pub const DEFAULT_TRUSTEE: &str = "aggregationProvider";

const FIRST_NAME: &str = "firstName";
const LAST_NAME: &str = "lastName";

/// A rewrite applied to a response payload before it is handed to a reader.
///
/// Implementations must not fail: when the payload cannot be handled they
/// return it unchanged.
pub trait PayloadTransform: Send + Sync {
    fn apply<'a>(&self, payload: &'a [u8]) -> Cow<'a, [u8]>;
}

/// Masks owner names of building records held by selected trustees.
#[derive(Debug, Clone)]
pub struct AnonymizingTransform {
    trustees: Vec<String>,
}

impl Default for AnonymizingTransform {
    fn default() -> Self {
        Self::new([DEFAULT_TRUSTEE])
    }
}

impl AnonymizingTransform {
    pub fn new<I, S>(trustees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trustees: trustees.into_iter().map(Into::into).collect(),
        }
    }

    pub fn trustees(&self) -> &[String] {
        &self.trustees
    }

    fn is_eligible(&self, record: &BuildingRecord) -> bool {
        record
            .data_trustee
            .as_deref()
            .is_some_and(|trustee| self.trustees.iter().any(|t| t == trustee))
    }

    /// Check the payload against [`BuildingRecord`] and mask the names in
    /// place. `Ok(None)` means the payload must pass through as is.
    ///
    /// The parsed document is edited rather than the typed record, so
    /// fields the record does not model and the original number formats
    /// survive the rewrite.
    fn anonymize(&self, payload: &[u8]) -> Result<Option<Vec<u8>>, TransformError> {
        let mut value: Value = serde_json::from_slice(payload).map_err(TransformError::InvalidFormat)?;
        if value.is_null() {
            warn!("payload decoded to null, skipping anonymization");
            return Ok(None);
        }
        if !value.is_object() {
            return Err(TransformError::Shape(format!("expected an object, found {}", kind_of(&value))));
        }

        let record = BuildingRecord::deserialize(&value).map_err(|e| TransformError::Shape(e.to_string()))?;
        if !self.is_eligible(&record) {
            return Ok(None);
        }

        for key in [FIRST_NAME, LAST_NAME] {
            if let Some(Value::String(name)) = value.get_mut(key) {
                *name = mask(name);
            }
        }
        debug!(id = ?record.id, "anonymized building record");

        serde_json::to_vec(&value)
            .map(Some)
            .map_err(TransformError::Serialize)
    }
}

impl PayloadTransform for AnonymizingTransform {
    fn apply<'a>(&self, payload: &'a [u8]) -> Cow<'a, [u8]> {
        if payload.is_empty() {
            return Cow::Borrowed(payload);
        }

        let rewritten = match self.anonymize(payload) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Cow::Borrowed(payload),
            Err(TransformError::InvalidFormat(e)) => {
                warn!(error = %e, "invalid JSON format, skipping anonymization");
                return Cow::Borrowed(payload);
            }
            Err(e) => {
                warn!(error = %e, "failed to process JSON body, skipping anonymization");
                return Cow::Borrowed(payload);
            }
        };

        if serde_json::from_slice::<IgnoredAny>(&rewritten).is_err() {
            warn!("anonymization produced invalid JSON, returning original body");
            return Cow::Borrowed(payload);
        }

        Cow::Owned(rewritten)
    }
}

/// Replace every character with `*`, keeping the character count.
pub fn mask(value: &str) -> String {
    "*".repeat(value.chars().count())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
