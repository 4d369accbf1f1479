//! Purpose: Shared library crate used by the `sumweb` CLI and tests.
//! Exports: `core` (decoding, summation, errors) and `api` (service, wire types, client).
//! Role: Backs the server and the demo client; both sides share one set of wire types.
//! Invariants: Core modules are pure and keep no state between requests.
pub mod api;
pub mod core;
