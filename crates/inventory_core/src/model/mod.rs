//! Domain model for inventory items and the entities they reference.
//!
//! # Responsibility
//! - Define persisted record shapes with explicitly optional relation edges.
//! - Define request shapes (`ItemQuery`, `ItemCreate`, `ItemUpdate`).
//! - Define output views and the pure mappers that produce them.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - An unloaded relation is `None`, never an error.

pub mod item;
pub mod mapper;
pub mod price;
pub mod related;
pub mod view;
