//! Persistence layer for the commerce backend.
//!
//! Defines the `ProductStore`, `CartStore`, and `OrderStore` traits and two
//! implementations: an in-memory store for tests and local runs, and a
//! PostgreSQL store keeping carts and orders as JSONB documents with a
//! dedicated stock column mutated only by atomic conditional updates.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{CartStore, OrderStore, ProductStore};
