//! Purpose: JSON envelopes exchanged between the sum server and its clients.
//! Exports: `SumRequest`, `SumResponse`, `ErrorEnvelope`, `ErrorBody`.
//! Invariants: Field names are the wire contract (`input`, `sum`, `error`).

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::core::error::{Error, ErrorKind};

/// Request body for `/sum`; borrows the caller's slice when sending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SumRequest<'a, T: Clone> {
    pub input: Cow<'a, [T]>,
}

impl<'a, T: Clone> SumRequest<'a, T> {
    pub fn new(input: &'a [T]) -> Self {
        Self {
            input: Cow::Borrowed(input),
        }
    }

    pub fn into_owned(self) -> Vec<T> {
        self.input.into_owned()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SumResponse {
    pub sum: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn from_error(err: &Error) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind().as_str().to_string(),
                message: err.message().unwrap_or("error").to_string(),
                hint: err.hint().map(str::to_string),
            },
        }
    }
}

impl ErrorBody {
    /// Unknown kinds from newer servers degrade to `Internal`.
    pub fn into_error(self) -> Error {
        let kind = ErrorKind::parse(&self.kind).unwrap_or(ErrorKind::Internal);
        let mut err = Error::new(kind).with_message(self.message);
        if let Some(hint) = self.hint {
            err = err.with_hint(hint);
        }
        err
    }
}
