//! Candidate records: the flat data validated against shapes.

use rustc_hash::FxHashMap;
use std::fmt;

/// A candidate value, tagged at the record boundary.
///
/// Callers type their scalars as string, number or boolean at their own
/// discretion; conversion to the constraint's datatype happens during
/// validation and is total (it reports a violation instead of failing).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string literal.
    String(String),
    /// A numeric literal.
    Number(f64),
    /// A boolean literal.
    Boolean(bool),
    /// A reference to another node.
    Iri(String),
}

impl Value {
    /// The lexical form used for length and pattern facets and for messages.
    pub fn lexical_form(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Iri(iri) => iri.clone(),
        }
    }

    /// Returns true for literal values (everything but [`Value::Iri`]).
    pub fn is_literal(&self) -> bool {
        !matches!(self, Self::Iri(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Iri(iri) => write!(f, "<{iri}>"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    #[expect(
        clippy::cast_precision_loss,
        reason = "convenience conversion for integer record values"
    )]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A flat candidate record: an ordered mapping from predicate key to values.
///
/// Predicate keys may be written prefixed (`ex:age`), bracketed
/// (`<http://example.org/age>`) or fully expanded; they are resolved through
/// the schema's prefix table when the record is validated. Key insertion
/// order is preserved so closed-shape violations are reported
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    id: Option<String>,
    values: FxHashMap<String, Vec<Value>>,
    key_order: Vec<String>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a caller-supplied node identifier, carried into the report
    /// for traceability only.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The caller-supplied node identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Appends a value for a predicate key.
    pub fn insert(&mut self, predicate: impl Into<String>, value: impl Into<Value>) {
        let predicate = predicate.into();
        if !self.values.contains_key(&predicate) {
            self.key_order.push(predicate.clone());
        }
        self.values.entry(predicate).or_default().push(value.into());
    }

    /// Appends several values for a predicate key.
    pub fn insert_all(
        &mut self,
        predicate: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) {
        let predicate = predicate.into();
        for value in values {
            self.insert(predicate.clone(), value);
        }
    }

    /// The values recorded for a predicate key, empty if absent.
    pub fn values(&self, predicate: &str) -> &[Value] {
        self.values.get(predicate).map_or(&[], Vec::as_slice)
    }

    /// Returns an iterator over predicate keys, in insertion order.
    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.key_order.iter().map(String::as_str)
    }

    /// Returns the number of distinct predicate keys.
    pub fn len(&self) -> usize {
        self.key_order.len()
    }

    /// Returns true if the record holds no property.
    pub fn is_empty(&self) -> bool {
        self.key_order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_lexical_forms() {
        assert_eq!(Value::from("Alice").lexical_form(), "Alice");
        assert_eq!(Value::from(30_i64).lexical_form(), "30");
        assert_eq!(Value::from(1.5).lexical_form(), "1.5");
        assert_eq!(Value::from(true).lexical_form(), "true");
        assert_eq!(
            Value::Iri("http://example.org/x".to_owned()).lexical_form(),
            "http://example.org/x"
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("a").to_string(), "\"a\"");
        assert_eq!(Value::Iri("x".to_owned()).to_string(), "<x>");
    }

    #[test]
    fn test_record_preserves_key_order() {
        let mut record = Record::new();
        record.insert("ex:b", "1");
        record.insert("ex:a", "2");
        record.insert("ex:b", "3");
        let keys: Vec<_> = record.predicates().collect();
        assert_eq!(keys, ["ex:b", "ex:a"]);
        assert_eq!(record.values("ex:b").len(), 2);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_record_missing_key_is_empty() {
        let record = Record::new();
        assert!(record.values("ex:missing").is_empty());
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_id() {
        let record = Record::new().with_id("node-1");
        assert_eq!(record.id(), Some("node-1"));
    }

    #[test]
    fn test_insert_all() {
        let mut record = Record::new();
        record.insert_all("ex:tag", vec![Value::from("a"), Value::from("b")]);
        assert_eq!(record.values("ex:tag").len(), 2);
    }
}
