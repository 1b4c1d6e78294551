//! Wire projections of authors and books.
//!
//! Field visibility lives in the static tables below; the generic serializer
//! in `bookshelf_view` does the filtering.

use bookshelf_authz::Audience;
use bookshelf_view::{Expose, Field, FieldValue, Version};
use serde_json::{json, Map, Value};

use super::entity::{Author, Book};

/// Group used by the author endpoints.
pub const AUTHOR_VIEW: &str = "getAuthors";
/// Group used by the book endpoints.
pub const BOOK_VIEW: &str = "getBooks";

const AUTHOR_FIELDS: &[Field] = &[
    Field::new("id", &[BOOK_VIEW, AUTHOR_VIEW]),
    Field::new("firstName", &[BOOK_VIEW, AUTHOR_VIEW]),
    Field::new("lastName", &[BOOK_VIEW, AUTHOR_VIEW]),
    Field::new("books", &[AUTHOR_VIEW]),
    Field::new("_links", &[AUTHOR_VIEW]),
];

const BOOK_FIELDS: &[Field] = &[
    Field::new("id", &[BOOK_VIEW, AUTHOR_VIEW]),
    Field::new("title", &[BOOK_VIEW, AUTHOR_VIEW]),
    Field::new("coverText", &[BOOK_VIEW, AUTHOR_VIEW]),
    Field::new("author", &[BOOK_VIEW]),
    Field::new("comment", &[BOOK_VIEW]).since(Version::new(2, 0)),
    Field::new("_links", &[BOOK_VIEW]),
];

/// Hypermedia links for one resource: `self` for everyone, `delete` and
/// `update` only for admins.
fn links(resource: &str, id: i64, audience: Audience) -> Value {
    let href = json!({ "href": format!("/api/{resource}/{id}") });
    let mut links = Map::new();
    links.insert("self".to_string(), href.clone());
    if audience.is_admin() {
        links.insert("delete".to_string(), href.clone());
        links.insert("update".to_string(), href);
    }
    Value::Object(links)
}

/// An author, optionally with the books they own.
pub struct AuthorView<'a> {
    author: &'a Author,
    books: Option<Vec<&'a Book>>,
    audience: Option<Audience>,
}

impl<'a> AuthorView<'a> {
    pub fn new(author: &'a Author) -> Self {
        Self {
            author,
            books: None,
            audience: None,
        }
    }

    /// Emit `_links` as seen by `audience`.
    pub fn with_links(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    /// Attach the author's books, picked from `books` by author id.
    pub fn with_books(mut self, books: &'a [Book]) -> Self {
        let id = self.author.id;
        self.books = Some(
            books
                .iter()
                .filter(|book| book.author_id == Some(id))
                .collect(),
        );
        self
    }
}

impl Expose for AuthorView<'_> {
    fn fields(&self) -> &'static [Field] {
        AUTHOR_FIELDS
    }

    fn value(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::scalar(self.author.id),
            "firstName" => FieldValue::scalar(self.author.first_name.as_str()),
            "lastName" => FieldValue::scalar(self.author.last_name.as_str()),
            "books" => match &self.books {
                Some(books) => FieldValue::many(books.iter().map(|book| BookView::new(book))),
                None => FieldValue::Unloaded,
            },
            "_links" => match self.audience {
                Some(audience) => FieldValue::scalar(links("authors", self.author.id, audience)),
                None => FieldValue::Unloaded,
            },
            _ => FieldValue::Unloaded,
        }
    }
}

/// A book, optionally with its resolved author.
pub struct BookView<'a> {
    book: &'a Book,
    author: Option<Option<&'a Author>>,
    audience: Option<Audience>,
}

impl<'a> BookView<'a> {
    pub fn new(book: &'a Book) -> Self {
        Self {
            book,
            author: None,
            audience: None,
        }
    }

    pub fn with_links(mut self, audience: Audience) -> Self {
        self.audience = Some(audience);
        self
    }

    /// Resolve the author from `authors` by the book's author id; a book
    /// without a matching author serializes `author` as null.
    pub fn with_author(mut self, authors: &'a [Author]) -> Self {
        let author = self
            .book
            .author_id
            .and_then(|id| authors.iter().find(|author| author.id == id));
        self.author = Some(author);
        self
    }
}

impl Expose for BookView<'_> {
    fn fields(&self) -> &'static [Field] {
        BOOK_FIELDS
    }

    fn value(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::scalar(self.book.id),
            "title" => FieldValue::scalar(self.book.title.as_str()),
            "coverText" => FieldValue::scalar(self.book.cover_text.as_deref()),
            "comment" => FieldValue::scalar(self.book.comment.as_deref()),
            "author" => match self.author {
                Some(author) => FieldValue::one(author.map(AuthorView::new)),
                None => FieldValue::Unloaded,
            },
            "_links" => match self.audience {
                Some(audience) => FieldValue::scalar(links("books", self.book.id, audience)),
                None => FieldValue::Unloaded,
            },
            _ => FieldValue::Unloaded,
        }
    }
}
