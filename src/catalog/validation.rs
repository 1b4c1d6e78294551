use serde::Serialize;

use super::entity::{AuthorDraft, BookDraft};

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;

/// One failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

pub trait Validate {
    /// Every violated constraint; empty when the value is valid.
    fn validate(&self) -> Vec<Violation>;
}

/// Required string of `MIN_NAME_LEN..=MAX_NAME_LEN` characters.
fn check_name(field: &'static str, label: &str, value: &str, out: &mut Vec<Violation>) {
    if value.trim().is_empty() {
        out.push(Violation {
            field,
            message: format!("{label} is required"),
        });
        return;
    }

    let len = value.chars().count();
    if len < MIN_NAME_LEN {
        out.push(Violation {
            field,
            message: format!("{label} must be at least {MIN_NAME_LEN} characters"),
        });
    } else if len > MAX_NAME_LEN {
        out.push(Violation {
            field,
            message: format!("{label} cannot be longer than {MAX_NAME_LEN} characters"),
        });
    }
}

impl Validate for AuthorDraft {
    fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_name("firstName", "first name", &self.first_name, &mut violations);
        check_name("lastName", "last name", &self.last_name, &mut violations);
        violations
    }
}

impl Validate for BookDraft {
    fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_name("title", "title", &self.title, &mut violations);
        violations
    }
}
