//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented item data access contracts.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Group-scoped APIs never expose items of another group.
//! - Repository APIs return semantic errors (`NotFound`, `Cancelled`) in
//!   addition to DB transport errors.

pub mod context;
mod eager;
pub mod id_set;
pub mod item_repo;
pub mod pagination;
pub mod predicate;
mod row;

pub use context::QueryContext;
pub use id_set::{reconcile_labels, IdSet, LabelDiff};
pub use item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use pagination::{calculate_offset, PaginationResult};
pub use predicate::{ItemPredicate, TextField};
