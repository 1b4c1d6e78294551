use crate::serializer::Context;
use crate::version::Version;

/// Exposure metadata for one wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub groups: &'static [&'static str],
    pub since: Option<Version>,
}

impl Field {
    pub const fn new(name: &'static str, groups: &'static [&'static str]) -> Self {
        Self {
            name,
            groups,
            since: None,
        }
    }

    /// Hide the field from callers that negotiated an older version.
    pub const fn since(self, version: Version) -> Self {
        Self {
            since: Some(version),
            ..self
        }
    }

    pub fn is_visible(&self, ctx: &Context) -> bool {
        let in_group = self.groups.iter().any(|group| ctx.has_group(group));
        let version_ok = self.since.map_or(true, |since| ctx.version() >= since);
        in_group && version_ok
    }
}

/// Value of a field as seen by the serializer.
pub enum FieldValue<'a> {
    Scalar(serde_json::Value),
    One(Option<Box<dyn Expose + 'a>>),
    Many(Vec<Box<dyn Expose + 'a>>),
    /// Relation not loaded for this projection; never written.
    Unloaded,
}

impl<'a> FieldValue<'a> {
    pub fn scalar(value: impl Into<serde_json::Value>) -> Self {
        FieldValue::Scalar(value.into())
    }

    pub fn one<T: Expose + 'a>(value: Option<T>) -> Self {
        FieldValue::One(value.map(|v| Box::new(v) as Box<dyn Expose + 'a>))
    }

    pub fn many<T, I>(values: I) -> Self
    where
        T: Expose + 'a,
        I: IntoIterator<Item = T>,
    {
        FieldValue::Many(
            values
                .into_iter()
                .map(|v| Box::new(v) as Box<dyn Expose + 'a>)
                .collect(),
        )
    }
}

/// A record that can be written by the filtering serializer.
pub trait Expose {
    /// Field table in declaration order.
    fn fields(&self) -> &'static [Field];

    /// Current value of the named field.
    fn value(&self, name: &str) -> FieldValue<'_>;
}
