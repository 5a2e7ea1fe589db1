//! redb table definitions for [`RedbStore`](crate::RedbStore).

use redb::TableDefinition;

/// Placement records keyed by append sequence number, JSON-serialized.
pub const PLACEMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("placements");
