//! redb table definitions for the Tether state store.
//!
//! Each table uses `&str` keys and `&[u8]` values (JSON-serialized domain types).

use redb::TableDefinition;

/// Operations keyed by `{namespace}/{name}`.
pub const OPERATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("operations");

/// Node info keyed by node name.
pub const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
