use serde_json::{Map, Value};

use crate::field::{Expose, FieldValue};
use crate::version::Version;

/// Active groups and negotiated version for one serialization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    groups: Vec<&'static str>,
    version: Version,
}

impl Context {
    pub fn new(groups: &[&'static str]) -> Self {
        Self {
            groups: groups.to_vec(),
            version: Version::BASELINE,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|active| *active == group)
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

/// Serialize one record into a JSON object holding only its visible fields.
pub fn serialize(item: &dyn Expose, ctx: &Context) -> Value {
    let mut object = Map::new();

    for field in item.fields() {
        if !field.is_visible(ctx) {
            continue;
        }

        let value = match item.value(field.name) {
            FieldValue::Scalar(value) => value,
            FieldValue::One(Some(related)) => serialize(related.as_ref(), ctx),
            FieldValue::One(None) => Value::Null,
            FieldValue::Many(related) => Value::Array(
                related
                    .iter()
                    .map(|entry| serialize(entry.as_ref(), ctx))
                    .collect(),
            ),
            FieldValue::Unloaded => continue,
        };

        object.insert(field.name.to_string(), value);
    }

    Value::Object(object)
}

/// Serialize a homogeneous sequence into a JSON array.
pub fn serialize_all<'a, T, I>(items: I, ctx: &Context) -> Value
where
    T: Expose + 'a,
    I: IntoIterator<Item = &'a T>,
{
    Value::Array(items.into_iter().map(|item| serialize(item, ctx)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    const READERS: &str = "readers";
    const SHELVES: &str = "shelves";

    struct Shelf {
        id: i64,
        label: &'static str,
        notes: Option<&'static str>,
        items: Option<Vec<Item>>,
    }

    #[derive(Clone)]
    struct Item {
        id: i64,
        name: &'static str,
    }

    const SHELF_FIELDS: &[Field] = &[
        Field::new("id", &[READERS, SHELVES]),
        Field::new("label", &[SHELVES]),
        Field::new("notes", &[SHELVES]).since(Version::new(2, 0)),
        Field::new("items", &[SHELVES]),
    ];

    const ITEM_FIELDS: &[Field] = &[Field::new("id", &[SHELVES]), Field::new("name", &[READERS])];

    impl Expose for Shelf {
        fn fields(&self) -> &'static [Field] {
            SHELF_FIELDS
        }

        fn value(&self, name: &str) -> FieldValue<'_> {
            match name {
                "id" => FieldValue::scalar(self.id),
                "label" => FieldValue::scalar(self.label),
                "notes" => FieldValue::scalar(self.notes),
                "items" => match &self.items {
                    Some(items) => FieldValue::many(items.iter().cloned()),
                    None => FieldValue::Unloaded,
                },
                _ => FieldValue::Unloaded,
            }
        }
    }

    impl Expose for Item {
        fn fields(&self) -> &'static [Field] {
            ITEM_FIELDS
        }

        fn value(&self, name: &str) -> FieldValue<'_> {
            match name {
                "id" => FieldValue::scalar(self.id),
                "name" => FieldValue::scalar(self.name),
                _ => FieldValue::Unloaded,
            }
        }
    }

    fn shelf() -> Shelf {
        Shelf {
            id: 7,
            label: "fiction",
            notes: Some("top row"),
            items: Some(vec![Item { id: 1, name: "Dune" }]),
        }
    }

    #[test]
    fn keeps_declaration_order_and_filters_by_group() {
        let ctx = Context::new(&[SHELVES]);
        let json = serialize(&shelf(), &ctx).to_string();
        assert_eq!(json, r#"{"id":7,"label":"fiction","items":[{"id":1}]}"#);
    }

    #[test]
    fn version_gated_field_appears_from_its_version() {
        let below = serialize(&shelf(), &Context::new(&[SHELVES]).with_version(Version::new(1, 9)));
        let at = serialize(&shelf(), &Context::new(&[SHELVES]).with_version(Version::new(2, 0)));
        assert!(below.get("notes").is_none());
        assert_eq!(at["notes"], "top row");
    }

    #[test]
    fn relations_recurse_with_same_groups() {
        let ctx = Context::new(&[READERS, SHELVES]);
        let value = serialize(&shelf(), &ctx);
        assert_eq!(value["items"][0]["id"], 1);
        assert_eq!(value["items"][0]["name"], "Dune");
    }

    #[test]
    fn unloaded_relation_is_omitted_and_null_scalar_kept() {
        let mut bare = shelf();
        bare.items = None;
        bare.notes = None;
        let value = serialize(&bare, &Context::new(&[SHELVES]).with_version(Version::new(2, 0)));
        assert!(value.get("items").is_none());
        assert_eq!(value["notes"], Value::Null);
    }

    #[test]
    fn collection_output_is_stable() {
        let shelves = vec![shelf(), shelf()];
        let ctx = Context::new(&[READERS]);
        let first = serialize_all(&shelves, &ctx).to_string();
        let second = serialize_all(&shelves, &ctx).to_string();
        assert_eq!(first, r#"[{"id":7},{"id":7}]"#);
        assert_eq!(first, second);
    }
}
