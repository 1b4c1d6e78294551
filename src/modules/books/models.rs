use serde::Deserialize;
use serde_json::Value;

use crate::catalog::BookDraft;

/// Body of `POST` and `PUT /api/books`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover_text: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Author reference; an integer or a numeric string. Anything else, or
    /// an id that matches no author, leaves the book without an author.
    #[serde(default)]
    pub id_author: Option<Value>,
}

impl BookPayload {
    pub fn author_reference(&self) -> Option<i64> {
        match self.id_author.as_ref()? {
            Value::Number(number) => number.as_i64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    /// Draft with the author reference as sent; the store drops it when the
    /// author does not exist.
    pub fn into_draft(self) -> BookDraft {
        let author_id = self.author_reference();
        BookDraft {
            title: self.title.unwrap_or_default(),
            cover_text: self.cover_text,
            comment: self.comment,
            author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> BookPayload {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn author_reference_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(r#"{"idAuthor":1}"#).author_reference(), Some(1));
        assert_eq!(parse(r#"{"idAuthor":"12"}"#).author_reference(), Some(12));
        assert_eq!(parse(r#"{"idAuthor":"twelve"}"#).author_reference(), None);
        assert_eq!(parse(r#"{"idAuthor":null}"#).author_reference(), None);
        assert_eq!(parse(r#"{"idAuthor":1.5}"#).author_reference(), None);
        assert_eq!(parse("{}").author_reference(), None);
    }

    #[test]
    fn draft_copies_optional_text() {
        let draft = parse(r#"{"title":"Dune","coverText":"Desert planet","idAuthor":3}"#).into_draft();
        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.cover_text.as_deref(), Some("Desert planet"));
        assert_eq!(draft.comment, None);
        assert_eq!(draft.author_id, Some(3));
    }
}
