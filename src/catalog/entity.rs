/// A person who writes books. Owned books are found through
/// [`Book::author_id`], never stored on the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    /// Owning side of the author relation; cleared books have no author.
    pub author_id: Option<i64>,
}

/// Settable author fields, before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
}

/// Settable book fields, before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author_id: Option<i64>,
}

impl AuthorDraft {
    pub(crate) fn into_author(self, id: i64) -> Author {
        Author {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }

    pub(crate) fn apply_to(self, author: &mut Author) {
        author.first_name = self.first_name;
        author.last_name = self.last_name;
    }
}

impl BookDraft {
    pub(crate) fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            cover_text: self.cover_text,
            comment: self.comment,
            author_id: self.author_id,
        }
    }

    /// Overwrite `book` with the draft. A draft without a comment keeps the
    /// stored one.
    pub(crate) fn apply_to(self, book: &mut Book) {
        book.title = self.title;
        book.cover_text = self.cover_text;
        if let Some(comment) = self.comment {
            book.comment = Some(comment);
        }
        book.author_id = self.author_id;
    }
}
