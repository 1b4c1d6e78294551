//! In-memory storage backing the application repositories.
//!
//! A [`Table`] is a plain id-ordered record map with its own id sequence.
//! Repositories group their tables in one schema struct and wrap it in a
//! [`MemoryStore`], so a write spanning several tables commits under a
//! single lock.

mod page;
mod store;
mod table;

pub use page::PageRequest;
pub use store::MemoryStore;
pub use table::{StoreError, Table};
