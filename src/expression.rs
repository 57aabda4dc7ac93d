//! # Typed filter and update expressions.
//!
//! Both builders hold an ordered list of field operations and translate it into
//! DynamoDB expression syntax with positional placeholders (`#f0`, `:v0`, ...),
//! so the rendered expression never depends on how a field is spelled. The same
//! operations can be evaluated against a JSON document, which is what the
//! in-memory store does.

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    /// `SET #f = :v`
    Set,
    /// `SET #f = list_append(#f, :v)`
    Append,
}

/// An expression string together with its attribute name and value maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, Value>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
    #[error("attribute {0} is not a list")]
    NotAList(String),
    #[error("value appended to {0} is not a list")]
    AppendNotAList(String),
}

#[derive(Default)]
struct Placeholders {
    names: HashMap<String, String>,
    values: HashMap<String, Value>,
}

impl Placeholders {
    fn bind(&mut self, index: usize, field: &str, value: &Value) -> (String, String) {
        let name = format!("#f{}", index);
        let value_token = format!(":v{}", index);
        self.names.insert(name.clone(), field.to_owned());
        self.values.insert(value_token.clone(), value.clone());
        (name, value_token)
    }

    fn finish(self, expression: String) -> Rendered {
        Rendered {
            expression,
            names: self.names,
            values: self.values,
        }
    }
}

/// Conjunction of equality conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    /// One equality condition per field of `record`.
    pub fn from_fields(record: &Map<String, Value>) -> Self {
        record
            .iter()
            .fold(Filter::new(), |filter, (field, value)| {
                filter.equals(field.as_str(), value.clone())
            })
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn render(&self) -> Option<Rendered> {
        if self.is_empty() {
            return None;
        }

        let mut placeholders = Placeholders::default();
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .enumerate()
            .map(|(index, (field, value))| {
                let (name, value) = placeholders.bind(index, field, value);
                format!("{} = {}", name, value)
            })
            .collect();

        Some(placeholders.finish(clauses.join(" AND ")))
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

/// Ordered list of `SET` actions against a single item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    actions: Vec<(String, UpdateOp, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Update::default()
    }

    /// One `SET` per field of `record`; null fields are skipped.
    pub fn from_fields(record: &Map<String, Value>) -> Self {
        record
            .iter()
            .filter(|(_, value)| !value.is_null())
            .fold(Update::new(), |update, (field, value)| {
                update.set(field.as_str(), value.clone())
            })
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.actions.push((field.into(), UpdateOp::Set, value.into()));
        self
    }

    pub fn append(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.actions
            .push((field.into(), UpdateOp::Append, Value::Array(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn render(&self) -> Option<Rendered> {
        if self.is_empty() {
            return None;
        }

        let mut placeholders = Placeholders::default();
        let clauses: Vec<String> = self
            .actions
            .iter()
            .enumerate()
            .map(|(index, (field, op, value))| {
                let (name, value) = placeholders.bind(index, field, value);
                match op {
                    UpdateOp::Set => format!("{} = {}", name, value),
                    UpdateOp::Append => format!("{} = list_append({}, {})", name, name, value),
                }
            })
            .collect();

        Some(placeholders.finish(format!("SET {}", clauses.join(", "))))
    }

    /// Applies the actions in order, with DynamoDB's semantics: `list_append`
    /// on an attribute that is missing or not a list fails.
    pub fn apply(&self, document: &mut Map<String, Value>) -> Result<(), ApplyError> {
        for (field, op, value) in &self.actions {
            match op {
                UpdateOp::Set => {
                    document.insert(field.clone(), value.clone());
                }
                UpdateOp::Append => {
                    let extra = value
                        .as_array()
                        .ok_or_else(|| ApplyError::AppendNotAList(field.clone()))?;
                    let current = document
                        .get_mut(field)
                        .and_then(Value::as_array_mut)
                        .ok_or_else(|| ApplyError::NotAList(field.clone()))?;
                    current.extend(extra.iter().cloned());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_builders_render_nothing() {
        assert_eq!(Filter::new().render(), None);
        assert_eq!(Update::new().render(), None);
    }

    #[test]
    fn filter_renders_positional_placeholders() {
        let rendered = Filter::new()
            .equals("name", "Test Band")
            .equals("country", "US")
            .render()
            .expect("filter is not empty");

        assert_eq!(rendered.expression, "#f0 = :v0 AND #f1 = :v1");
        assert_eq!(rendered.names["#f0"], "name");
        assert_eq!(rendered.names["#f1"], "country");
        assert_eq!(rendered.values[":v0"], json!("Test Band"));
        assert_eq!(rendered.values[":v1"], json!("US"));
    }

    #[test]
    fn field_spelling_does_not_leak_into_expression() {
        let rendered = Filter::new()
            .equals("weird name-with:chars", 1)
            .render()
            .expect("filter is not empty");

        assert_eq!(rendered.expression, "#f0 = :v0");
        assert_eq!(rendered.names["#f0"], "weird name-with:chars");
    }

    #[test]
    fn update_renders_set_and_append() {
        let rendered = Update::new()
            .set("name", "Renamed")
            .append("albums", vec![json!({"id": "a1"})])
            .render()
            .expect("update is not empty");

        assert_eq!(
            rendered.expression,
            "SET #f0 = :v0, #f1 = list_append(#f1, :v1)"
        );
        assert_eq!(rendered.names["#f1"], "albums");
        assert_eq!(rendered.values[":v1"], json!([{"id": "a1"}]));
    }

    #[test]
    fn update_from_fields_skips_nulls() {
        let record = json!({"name": "X", "genre": null});
        let update = Update::from_fields(record.as_object().expect("object"));
        let rendered = update.render().expect("update is not empty");

        assert_eq!(rendered.expression, "SET #f0 = :v0");
        assert_eq!(rendered.names["#f0"], "name");
    }

    #[test]
    fn filter_matches_documents() {
        let filter = Filter::from_fields(json!({"name": "A"}).as_object().expect("object"));
        assert!(filter.matches(&json!({"id": "1", "name": "A"})));
        assert!(!filter.matches(&json!({"id": "2", "name": "B"})));
        assert!(!filter.matches(&json!({"id": "3"})));
    }

    #[test]
    fn apply_appends_to_existing_list() {
        let mut doc = json!({"id": "1", "albums": [{"id": "a"}]})
            .as_object()
            .cloned()
            .expect("object");

        Update::new()
            .append("albums", vec![json!({"id": "b"})])
            .apply(&mut doc)
            .expect("append succeeds");

        assert_eq!(Value::Object(doc), json!({"id": "1", "albums": [{"id": "a"}, {"id": "b"}]}));
    }

    #[test]
    fn apply_append_on_missing_list_fails() {
        let mut doc = json!({"id": "1"}).as_object().cloned().expect("object");

        let err = Update::new()
            .append("albums", vec![json!({"id": "b"})])
            .apply(&mut doc)
            .unwrap_err();

        assert_eq!(err, ApplyError::NotAList("albums".to_owned()));
    }
}
