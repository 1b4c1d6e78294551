/// Cache key for one page of a resource listing as rendered for `audience`.
///
/// Identical `(resource, page, limit, audience)` tuples map to the same key;
/// any differing component yields a different key.
pub fn list_key(resource: &str, page: u32, limit: u32, audience: &str) -> String {
    format!("list:{resource}:{page}:{limit}:{audience}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_parameters_collide() {
        assert_eq!(
            list_key("books", 1, 3, "public"),
            list_key("books", 1, 3, "public")
        );
    }

    #[test]
    fn differing_parameters_never_collide() {
        let keys = [
            list_key("books", 1, 3, "public"),
            list_key("books", 3, 1, "public"),
            list_key("books", 13, 1, "public"),
            list_key("books", 1, 31, "public"),
            list_key("books", 1, 3, "admin"),
            list_key("authors", 1, 3, "public"),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
