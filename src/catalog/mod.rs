//! Authors, books, their storage contracts and wire projections.

pub mod entity;
pub mod repository;
pub mod validation;
pub mod views;

pub use entity::{Author, AuthorDraft, Book, BookDraft};
pub use repository::{AuthorRemoval, AuthorRepository, BookRepository, InMemoryCatalog, RepoError};
pub use validation::{Validate, Violation};
