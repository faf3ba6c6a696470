//! SQLite store access for the tier tables

pub mod init;
pub mod schema;
pub mod store;
pub mod table_schemas;

pub use init::{open_memory_pool, open_pool, open_pool_readonly};
pub use schema::{create_table, ColumnDefinition, SchemaIntrospector, TableSchema};
pub use store::{
    BronzeStore, ConflictPolicy, GoldStore, InsertOutcome, SilverStore, SqliteStore, TierRecord,
    TierStore,
};
pub use table_schemas::{BronzeTableSchema, GoldTableSchema, SilverTableSchema};
