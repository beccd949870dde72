//! tether-state — persisted operation and node state for Tether.
//!
//! Backed by [redb](https://docs.rs/redb). Operations are keyed by
//! `{namespace}/{name}` and nodes by their name; values are JSON.
//!
//! Operation status is externally owned: each run has one writer, and
//! status writes go through [`StateStore::update_operation_status`], which
//! checks the caller's `resource_version` so a stale snapshot can never
//! overwrite a newer one.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
