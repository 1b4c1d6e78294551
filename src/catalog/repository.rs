use std::collections::BTreeSet;

use async_trait::async_trait;
use bookshelf_db::{MemoryStore, PageRequest, StoreError, Table};
use bookshelf_http::error::AppError;
use thiserror::Error;

use super::entity::{Author, AuthorDraft, Book, BookDraft};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { .. } => AppError::not_found(err.to_string()),
            RepoError::Store(StoreError::InvalidPage { .. }) => AppError::bad_request(err.to_string()),
            RepoError::Store(other) => AppError::Internal(other.into()),
        }
    }
}

/// Outcome of removing an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRemoval {
    pub author: Author,
    /// Ids of the books removed with the author.
    pub cascaded_books: Vec<i64>,
}

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn find_author(&self, id: i64) -> Result<Option<Author>, RepoError>;

    async fn find_authors(&self, ids: &[i64]) -> Result<Vec<Author>, RepoError>;

    async fn find_all_authors(&self) -> Result<Vec<Author>, RepoError>;

    async fn find_author_page(&self, page: PageRequest) -> Result<Vec<Author>, RepoError>;

    async fn create_author(&self, draft: AuthorDraft) -> Result<Author, RepoError>;

    async fn update_author(&self, id: i64, draft: AuthorDraft) -> Result<Author, RepoError>;

    /// Remove the author and, in the same commit, every book they own.
    async fn delete_author(&self, id: i64) -> Result<AuthorRemoval, RepoError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn find_book(&self, id: i64) -> Result<Option<Book>, RepoError>;

    async fn find_all_books(&self) -> Result<Vec<Book>, RepoError>;

    async fn find_book_page(&self, page: PageRequest) -> Result<Vec<Book>, RepoError>;

    /// Inverse side of the author relation, in book id order.
    async fn books_by_authors(&self, author_ids: &[i64]) -> Result<Vec<Book>, RepoError>;

    /// A draft naming a missing author is stored without one.
    async fn create_book(&self, draft: BookDraft) -> Result<Book, RepoError>;

    async fn update_book(&self, id: i64, draft: BookDraft) -> Result<Book, RepoError>;

    async fn delete_book(&self, id: i64) -> Result<Book, RepoError>;
}

struct Schema {
    authors: Table<Author>,
    books: Table<Book>,
}

impl Schema {
    fn known_author(&self, author_id: Option<i64>) -> Option<i64> {
        author_id.filter(|id| self.authors.contains(*id))
    }
}

/// Process-local catalog implementing both repositories over one store.
pub struct InMemoryCatalog {
    store: MemoryStore<Schema>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(Schema {
                authors: Table::named("author"),
                books: Table::named("book"),
            }),
        }
    }

    pub fn counts(&self) -> (usize, usize) {
        self.store.read(|s| (s.authors.len(), s.books.len()))
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(entity: &'static str) -> impl Fn(StoreError) -> RepoError {
    move |err| match err {
        StoreError::NotFound { id, .. } => RepoError::NotFound { entity, id },
        other => RepoError::Store(other),
    }
}

#[async_trait]
impl AuthorRepository for InMemoryCatalog {
    async fn find_author(&self, id: i64) -> Result<Option<Author>, RepoError> {
        Ok(self.store.read(|s| s.authors.get(id).cloned()))
    }

    async fn find_authors(&self, ids: &[i64]) -> Result<Vec<Author>, RepoError> {
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(self.store.read(|s| {
            wanted
                .iter()
                .filter_map(|id| s.authors.get(*id).cloned())
                .collect()
        }))
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, RepoError> {
        Ok(self.store.read(|s| s.authors.iter().cloned().collect()))
    }

    async fn find_author_page(&self, page: PageRequest) -> Result<Vec<Author>, RepoError> {
        Ok(self.store.read(|s| s.authors.page(page).cloned().collect()))
    }

    async fn create_author(&self, draft: AuthorDraft) -> Result<Author, RepoError> {
        let author = self
            .store
            .write(|s| s.authors.insert(|id| draft.into_author(id)).clone());
        tracing::debug!(author_id = author.id, "author created");
        Ok(author)
    }

    async fn update_author(&self, id: i64, draft: AuthorDraft) -> Result<Author, RepoError> {
        self.store
            .write(|s| {
                s.authors.update(id, |author| {
                    draft.apply_to(author);
                    author.clone()
                })
            })
            .map_err(not_found("author"))
    }

    async fn delete_author(&self, id: i64) -> Result<AuthorRemoval, RepoError> {
        let removal = self
            .store
            .write(|s| {
                let author = s.authors.remove(id)?;
                let cascaded_books = s.books.remove_where(|book| book.author_id == Some(id));
                Ok::<_, StoreError>(AuthorRemoval {
                    author,
                    cascaded_books,
                })
            })
            .map_err(not_found("author"))?;

        tracing::debug!(
            author_id = id,
            cascaded = removal.cascaded_books.len(),
            "author deleted"
        );
        Ok(removal)
    }
}

#[async_trait]
impl BookRepository for InMemoryCatalog {
    async fn find_book(&self, id: i64) -> Result<Option<Book>, RepoError> {
        Ok(self.store.read(|s| s.books.get(id).cloned()))
    }

    async fn find_all_books(&self) -> Result<Vec<Book>, RepoError> {
        Ok(self.store.read(|s| s.books.iter().cloned().collect()))
    }

    async fn find_book_page(&self, page: PageRequest) -> Result<Vec<Book>, RepoError> {
        Ok(self.store.read(|s| s.books.page(page).cloned().collect()))
    }

    async fn books_by_authors(&self, author_ids: &[i64]) -> Result<Vec<Book>, RepoError> {
        Ok(self.store.read(|s| {
            s.books
                .iter()
                .filter(|book| book.author_id.is_some_and(|id| author_ids.contains(&id)))
                .cloned()
                .collect()
        }))
    }

    async fn create_book(&self, mut draft: BookDraft) -> Result<Book, RepoError> {
        let book = self.store.write(|s| {
            draft.author_id = s.known_author(draft.author_id);
            s.books.insert(|id| draft.into_book(id)).clone()
        });
        tracing::debug!(book_id = book.id, author_id = ?book.author_id, "book created");
        Ok(book)
    }

    async fn update_book(&self, id: i64, mut draft: BookDraft) -> Result<Book, RepoError> {
        self.store
            .write(|s| {
                draft.author_id = s.known_author(draft.author_id);
                s.books.update(id, |book| {
                    draft.apply_to(book);
                    book.clone()
                })
            })
            .map_err(not_found("book"))
    }

    async fn delete_book(&self, id: i64) -> Result<Book, RepoError> {
        self.store
            .write(|s| s.books.remove(id))
            .map_err(not_found("book"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(first: &str, last: &str) -> AuthorDraft {
        AuthorDraft {
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    fn book(title: &str, author_id: Option<i64>) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn pages_are_id_ordered_slices() {
        let catalog = InMemoryCatalog::new();
        for i in 0..7 {
            catalog.create_book(book(&format!("Title {i}"), None)).await.unwrap();
        }

        let page = catalog
            .find_book_page(PageRequest::new(3, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![7]);

        let first = catalog
            .find_book_page(PageRequest::new(1, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(first.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(catalog.find_all_books().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn unknown_author_reference_is_dropped() {
        let catalog = InMemoryCatalog::new();
        let created = catalog.create_book(book("Dune", Some(9999))).await.unwrap();
        assert_eq!(created.author_id, None);
    }

    #[tokio::test]
    async fn deleting_author_cascades_to_books() {
        let catalog = InMemoryCatalog::new();
        let frank = catalog.create_author(author("Frank", "Herbert")).await.unwrap();
        let ursula = catalog.create_author(author("Ursula", "Le Guin")).await.unwrap();
        let dune = catalog.create_book(book("Dune", Some(frank.id))).await.unwrap();
        let messiah = catalog
            .create_book(book("Dune Messiah", Some(frank.id)))
            .await
            .unwrap();
        let earthsea = catalog
            .create_book(book("Earthsea", Some(ursula.id)))
            .await
            .unwrap();

        let removal = catalog.delete_author(frank.id).await.unwrap();
        assert_eq!(removal.cascaded_books, vec![dune.id, messiah.id]);
        assert!(catalog.find_book(dune.id).await.unwrap().is_none());
        assert!(catalog.find_book(earthsea.id).await.unwrap().is_some());
        assert_eq!(catalog.counts(), (1, 1));
        assert_eq!(catalog.find_all_authors().await.unwrap(), vec![ursula]);
    }

    #[tokio::test]
    async fn inverse_relation_follows_book_author_id() {
        let catalog = InMemoryCatalog::new();
        let frank = catalog.create_author(author("Frank", "Herbert")).await.unwrap();
        let dune = catalog.create_book(book("Dune", Some(frank.id))).await.unwrap();
        assert_eq!(
            catalog.books_by_authors(&[frank.id]).await.unwrap(),
            vec![dune.clone()]
        );

        catalog.update_book(dune.id, book("Dune", None)).await.unwrap();
        assert!(catalog.books_by_authors(&[frank.id]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_without_comment_keeps_the_stored_one() {
        let catalog = InMemoryCatalog::new();
        let dune = catalog
            .create_book(BookDraft {
                comment: Some("classic".to_string()),
                ..book("Dune", None)
            })
            .await
            .unwrap();

        let updated = catalog
            .update_book(
                dune.id,
                BookDraft {
                    cover_text: Some("x".to_string()),
                    ..book("Dune", None)
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.comment.as_deref(), Some("classic"));
        assert_eq!(updated.cover_text.as_deref(), Some("x"));

        let replaced = catalog
            .update_book(
                dune.id,
                BookDraft {
                    comment: Some("revised".to_string()),
                    ..book("Dune", None)
                },
            )
            .await
            .unwrap();
        assert_eq!(replaced.comment.as_deref(), Some("revised"));
        assert_eq!(replaced.cover_text, None);
    }

    #[tokio::test]
    async fn missing_ids_are_reported() {
        let catalog = InMemoryCatalog::new();
        assert!(matches!(
            catalog.update_author(4, author("Frank", "Herbert")).await,
            Err(RepoError::NotFound { entity: "author", id: 4 })
        ));
        assert!(matches!(
            catalog.delete_book(2).await,
            Err(RepoError::NotFound { entity: "book", id: 2 })
        ));
    }
}
