//! Core item storage for the home inventory.
//! Owns the SQLite schema, item queries and the item/label invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{ItemCreate, ItemId, ItemQuery, ItemRecord, ItemUpdate};
pub use model::view::{ItemAttachment, ItemOut, ItemSummary, LabelSummary, LocationSummary};
pub use repo::{
    ItemRepository, PaginationResult, QueryContext, RepoError, RepoResult, SqliteItemRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
