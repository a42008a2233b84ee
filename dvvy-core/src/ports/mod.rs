//! Port definitions (hexagonal architecture)
//!
//! Services depend on these traits, not on concrete storage.

mod repository;

pub use repository::GroupRepository;
