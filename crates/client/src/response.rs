//! Response envelope and polymorphic create-response decoding.
//!
//! Every warehouse endpoint answers `{ "success": bool, "message": string?,
//! "data": any? }`. The create endpoint's `data` comes in two shapes: the
//! full persisted dispatch with its `details` rows, or just the new `id`.

use serde::Deserialize;
use serde_json::Value;

use lotdispatch_core::{Dispatch, DispatchId};

use crate::error::ClientError;

/// The `{success, message, data}` wrapper around every response body.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

const fn default_success() -> bool {
    true
}

impl Envelope {
    /// Unwrap the `data` payload.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Server` for `success: false`, or
    /// `ClientError::NoData` when `data` is missing or null.
    pub fn into_data(self, status: u16) -> Result<Value, ClientError> {
        if !self.success {
            return Err(ClientError::server(status, self.message));
        }
        match self.data {
            None | Some(Value::Null) => Err(ClientError::NoData),
            Some(data) => Ok(data),
        }
    }
}

/// What the create endpoint handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The persisted dispatch with its detail rows.
    Full(Dispatch),
    /// Only the new dispatch's id; the record must be fetched.
    Reference(DispatchId),
}

impl CreateOutcome {
    /// Resolve the shape by field presence.
    ///
    /// A `details` array means the full record; otherwise an integer `id`
    /// means a reference. Neither shape is a decode failure.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` if a full record is malformed, or
    /// `ClientError::UnexpectedResponse` for any other shape.
    pub fn from_data(data: Value) -> Result<Self, ClientError> {
        let Value::Object(fields) = &data else {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected an object, got {}",
                kind(&data)
            )));
        };

        if fields.get("details").is_some_and(Value::is_array) {
            let dispatch: Dispatch = serde_json::from_value(data)?;
            return Ok(Self::Full(dispatch));
        }

        if let Some(id) = fields.get("id").and_then(Value::as_i64) {
            return Ok(Self::Reference(DispatchId::new(id)));
        }

        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Err(ClientError::UnexpectedResponse(format!(
            "object without details or id (fields: {})",
            keys.join(", ")
        )))
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
