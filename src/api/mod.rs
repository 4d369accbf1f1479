//! Purpose: Define the public Rust API boundary for sumweb.
//! Exports: Core types plus the sum service, wire types, remote client, and demo run.
//! Role: The surface used by the CLI binary and integration tests.
//! Invariants: Server and client share the wire types declared here.

pub mod demo;
mod remote;
mod service;
mod wire;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::numeric::{INPUT_FIELD, NumericArray, NumericKind, decode_request};
pub use crate::core::sum::{Precision, SumResult, sum_array};
pub use remote::RemoteClient;
pub use service::SumService;
pub use wire::{ErrorBody, ErrorEnvelope, SumRequest, SumResponse};
