//! Purpose: Resolve a `{"input": [...]}` payload into a tagged numeric array.
//! Exports: `NumericArray`, `NumericKind`, `decode_request`, `INPUT_FIELD`.
//! Role: Request decoding shared by the HTTP server and the CLI.
//! Invariants: Integer decoding is attempted before real decoding, always.
//! Invariants: The resolved variant represents every element exactly as written.
//! Notes: Elements are classified by their literal text, so `-0` is an integer.
//! Notes: Integer literals outside the i64 range resolve to `Real`.

use serde_json::value::RawValue;
use std::collections::BTreeMap;

use super::error::{Error, ErrorKind};

pub const INPUT_FIELD: &str = "input";

/// An ordered array of numbers in exactly one representation.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericArray {
    Integer(Vec<i64>),
    Real(Vec<f64>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumericKind {
    Integer,
    Real,
}

impl NumericKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NumericKind::Integer => "integer",
            NumericKind::Real => "real",
        }
    }
}

impl NumericArray {
    pub fn kind(&self) -> NumericKind {
        match self {
            NumericArray::Integer(_) => NumericKind::Integer,
            NumericArray::Real(_) => NumericKind::Real,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NumericArray::Integer(values) => values.len(),
            NumericArray::Real(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds an array from JSON numerals typed by a user, resolving the
    /// variant the same way a request body is resolved.
    pub fn from_literals<S: AsRef<str>>(literals: &[S]) -> Result<Self, Error> {
        let literals = literals
            .iter()
            .map(|literal| literal.as_ref().trim())
            .collect::<Vec<_>>();
        for literal in &literals {
            ensure_number_literal(literal)?;
        }
        resolve(&literals)
    }
}

/// Decodes a raw request body.
///
/// Fails with `MalformedPayload` when the body is not a JSON object, lacks
/// the `input` field, or `input` is not an array of numbers.
pub fn decode_request(bytes: &[u8]) -> Result<NumericArray, Error> {
    let fields = serde_json::from_slice::<BTreeMap<String, &RawValue>>(bytes).map_err(|err| {
        malformed("request body must be a json object")
            .with_hint("Send a body like {\"input\": [1, 2, 3]}.")
            .with_source(err)
    })?;
    let Some(input) = fields.get(INPUT_FIELD) else {
        return Err(malformed("missing `input` field")
            .with_hint("Send a body like {\"input\": [1, 2, 3]}."));
    };
    let elements = serde_json::from_str::<Vec<&RawValue>>(input.get())
        .map_err(|err| malformed("`input` must be an array of numbers").with_source(err))?;
    let literals = elements.iter().map(|raw| raw.get()).collect::<Vec<_>>();
    resolve(&literals)
}

fn resolve(literals: &[&str]) -> Result<NumericArray, Error> {
    let integers = literals
        .iter()
        .map(|literal| parse_integer(literal))
        .collect::<Option<Vec<_>>>();
    if let Some(values) = integers {
        return Ok(NumericArray::Integer(values));
    }
    literals
        .iter()
        .map(|literal| {
            serde_json::from_str::<f64>(literal).map_err(|err| {
                malformed("`input` must contain only numbers").with_source(err)
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(NumericArray::Real)
}

/// Whole-number literal (optional `-`, digits only) that fits in i64.
fn parse_integer(literal: &str) -> Option<i64> {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    literal.parse().ok()
}

fn ensure_number_literal(literal: &str) -> Result<(), Error> {
    let raw = serde_json::from_str::<&RawValue>(literal)
        .map_err(|err| malformed(format!("not a number: {literal}")).with_source(err))?;
    if raw
        .get()
        .starts_with(|c: char| c == '-' || c.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(malformed(format!("not a number: {literal}")))
    }
}

fn malformed(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::MalformedPayload).with_message(message)
}
