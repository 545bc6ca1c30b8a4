//! Guest-list records.

use crate::data::Value;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// One guest-list row, keyed by column name. Columns are free-form; only
/// [`GuestRecord::NAME_FIELD`] has meaning to the renderer.
#[derive(Debug, Clone, Default)]
pub struct GuestRecord(pub HashMap<String, Value>);

impl GuestRecord {
    /// Column the personalized greeting reads its name from.
    pub const NAME_FIELD: &'static str = "name";

    pub fn get(&self, field: &str) -> Value {
        self.0.get(field).cloned().unwrap_or_default()
    }

    /// The guest's name; empty when the column is missing or null, which
    /// makes the renderer fall back to its generic greeting.
    pub fn name(&self) -> String {
        self.get(Self::NAME_FIELD).to_string()
    }
}

struct GuestRecordVisitor;

impl<'de> Visitor<'de> for GuestRecordVisitor {
    type Value = GuestRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A: de::MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut fields = HashMap::new();
        while let Some((k, v)) = map.next_entry::<String, Value>()? {
            fields.insert(k, v);
        }
        Ok(GuestRecord(fields))
    }
}

impl<'de> Deserialize<'de> for GuestRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(GuestRecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn guest(pairs: &[(&str, Value)]) -> GuestRecord {
        GuestRecord(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn name_reads_the_name_column() {
        let g = guest(&[("name", Value::from("Mark")), ("group", Value::from("youth"))]);
        assert_eq!(g.name(), "Mark");
    }

    #[test]
    fn missing_name_is_empty() {
        let g = guest(&[("group", Value::from("band"))]);
        assert_eq!(g.name(), "");
        assert_eq!(g.get("name"), Value::Nil);
    }
}
