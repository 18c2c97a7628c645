//! Schema model types.
//!
//! This module defines the in-memory constraint model produced by the
//! [parser](crate::parse_schema) and consumed by the
//! [`ShapeValidator`](crate::ShapeValidator):
//! - [`Schema`] - prefix table plus named shapes
//! - [`Shape`] - one node type, an ordered list of triple constraints
//! - [`TripleConstraint`] - one property rule with cardinality and facets
//! - [`ValueExpr`], [`Datatype`], [`NodeKind`], [`Facet`] - the closed set
//!   of constraint kinds
//!
//! All types are immutable once parsing has finished; a [`Schema`] can be
//! shared read-only across any number of concurrent validations.

use crate::report::Severity;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::fmt;

/// The `http://www.w3.org/2001/XMLSchema#` namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// A parsed schema: a prefix table and a set of named shapes.
///
/// Shapes are kept in declaration order for deterministic iteration and
/// reporting. Shape identifiers are the verbatim bracketed tokens from the
/// source text (e.g. `<PersonShape>`) and are never prefix-expanded.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    prefixes: FxHashMap<String, String>,
    shapes: FxHashMap<String, Shape>,
    shape_order: Vec<String>,
}

impl Schema {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Parses a schema document. Equivalent to [`parse_schema`](crate::parse_schema).
    pub fn parse(text: &str) -> Result<Self, crate::SchemaParseError> {
        crate::parser::parse_schema(text)
    }

    /// Declares a prefix, overwriting any earlier declaration of the same
    /// label.
    pub(crate) fn declare_prefix(&mut self, label: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(label.into(), iri.into());
    }

    /// Inserts a shape. Returns `false` if the identifier is already taken.
    pub(crate) fn insert_shape(&mut self, shape: Shape) -> bool {
        if self.shapes.contains_key(&shape.id) {
            return false;
        }
        self.shape_order.push(shape.id.clone());
        self.shapes.insert(shape.id.clone(), shape);
        true
    }

    /// Gets the namespace IRI declared for a prefix label.
    pub fn prefix(&self, label: &str) -> Option<&str> {
        self.prefixes.get(label).map(String::as_str)
    }

    /// Returns an iterator over the declared prefixes.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(label, iri)| (label.as_str(), iri.as_str()))
    }

    /// Gets a shape by its verbatim identifier (e.g. `<PersonShape>`).
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Returns an iterator over shape identifiers, in declaration order.
    pub fn shape_ids(&self) -> impl Iterator<Item = &str> {
        self.shape_order.iter().map(String::as_str)
    }

    /// Returns an iterator over shapes, in declaration order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shape_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Returns the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Returns true if the schema declares no shape.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Resolves a term to its canonical fully-qualified form.
    ///
    /// This is the single resolution function applied to schema-declared
    /// predicates and datatypes at parse time and to record-supplied
    /// predicate keys at validation time, so that a term written `p:local`
    /// and one written fully expanded compare equal:
    /// - `<iri>` resolves to the inner IRI;
    /// - `prefix:local` resolves through the prefix table, `None` when the
    ///   prefix is not declared;
    /// - anything else (including absolute IRIs like `http://...`) is
    ///   returned unchanged.
    pub fn resolve(&self, term: &str) -> Option<String> {
        if let Some(inner) = term.strip_prefix('<') {
            return Some(inner.strip_suffix('>').unwrap_or(inner).to_owned());
        }
        if let Some((prefix, local)) = term.split_once(':') {
            // An absolute IRI like http://example.org/x is not a prefixed name
            if local.starts_with("//") {
                return Some(term.to_owned());
            }
            return self.prefixes.get(prefix).map(|ns| format!("{ns}{local}"));
        }
        Some(term.to_owned())
    }
}

impl fmt::Display for Schema {
    /// Debug/introspection rendering: prefix table, shape identifiers and
    /// constraint counts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Schema: {} prefix(es), {} shape(s)",
            self.prefixes.len(),
            self.shapes.len()
        )?;
        let mut prefixes: Vec<_> = self.prefixes().collect();
        prefixes.sort_unstable();
        for (label, iri) in prefixes {
            writeln!(f, "  PREFIX {label}: <{iri}>")?;
        }
        for shape in self.shapes() {
            writeln!(
                f,
                "  {} [{} constraint(s){}]",
                shape.id(),
                shape.expression().len(),
                if shape.closed() { ", closed" } else { "" }
            )?;
        }
        Ok(())
    }
}

/// One node type: an ordered sequence of triple constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: String,
    expression: Vec<TripleConstraint>,
    closed: bool,
}

impl Shape {
    /// Creates a new shape with the given verbatim identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expression: Vec::new(),
            closed: false,
        }
    }

    /// Appends a triple constraint.
    pub fn add_constraint(&mut self, constraint: TripleConstraint) {
        self.expression.push(constraint);
    }

    /// Marks this shape as closed.
    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// The verbatim shape identifier, angle brackets included.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The triple constraints, in declaration order.
    pub fn expression(&self) -> &[TripleConstraint] {
        &self.expression
    }

    /// Whether properties not matched by any constraint are violations.
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Returns true if this shape declares no constraint.
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }
}

/// One property rule within a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleConstraint {
    predicate: String,
    value_expr: ValueExpr,
    cardinality: Cardinality,
    facets: Vec<Facet>,
    severity: Severity,
}

impl TripleConstraint {
    /// Creates a new constraint on the given fully-expanded predicate IRI.
    pub fn new(predicate: impl Into<String>, value_expr: ValueExpr) -> Self {
        Self {
            predicate: predicate.into(),
            value_expr,
            cardinality: Cardinality::ONE,
            facets: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Sets the cardinality.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Appends a facet.
    #[must_use]
    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    /// Sets the severity of violations produced by this constraint.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// The fully-expanded predicate IRI.
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// The value expression.
    pub fn value_expr(&self) -> &ValueExpr {
        &self.value_expr
    }

    /// The cardinality.
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// The facets, in declaration order.
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// The severity of violations produced by this constraint.
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// The value expression of a triple constraint. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// Values must be convertible to the given datatype.
    Datatype(Datatype),
    /// Values must be of the given node kind.
    NodeKind(NodeKind),
    /// Values must reference a node of the given shape (verbatim shape
    /// identifier). The referenced node itself is not traversed.
    ShapeRef(String),
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datatype(datatype) => write!(f, "{}", datatype.iri()),
            Self::NodeKind(kind) => write!(f, "{kind}"),
            Self::ShapeRef(id) => write!(f, "@{id}"),
        }
    }
}

/// A datatype reference, resolved from its expanded IRI.
///
/// The closed variants are the scalar kinds the validator can coerce;
/// any other datatype IRI is kept as [`Datatype::Other`] and only requires
/// values to be literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// `xsd:string`
    String,
    /// `xsd:integer`
    Integer,
    /// `xsd:decimal`
    Decimal,
    /// `xsd:double`
    Double,
    /// `xsd:boolean`
    Boolean,
    /// `xsd:date`
    Date,
    /// `xsd:dateTime`
    DateTime,
    /// `xsd:anyURI`
    AnyUri,
    /// Any other datatype IRI.
    Other(String),
}

impl Datatype {
    /// Resolves a fully-expanded datatype IRI.
    pub fn from_iri(iri: &str) -> Self {
        match iri.strip_prefix(XSD_NS) {
            Some("string") => Self::String,
            Some("integer") => Self::Integer,
            Some("decimal") => Self::Decimal,
            Some("double") => Self::Double,
            Some("boolean") => Self::Boolean,
            Some("date") => Self::Date,
            Some("dateTime") => Self::DateTime,
            Some("anyURI") => Self::AnyUri,
            _ => Self::Other(iri.to_owned()),
        }
    }

    /// The full datatype IRI.
    pub fn iri(&self) -> String {
        match self {
            Self::String => format!("{XSD_NS}string"),
            Self::Integer => format!("{XSD_NS}integer"),
            Self::Decimal => format!("{XSD_NS}decimal"),
            Self::Double => format!("{XSD_NS}double"),
            Self::Boolean => format!("{XSD_NS}boolean"),
            Self::Date => format!("{XSD_NS}date"),
            Self::DateTime => format!("{XSD_NS}dateTime"),
            Self::AnyUri => format!("{XSD_NS}anyURI"),
            Self::Other(iri) => iri.clone(),
        }
    }

    /// Returns true for datatypes numeric range facets may refine.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Double)
    }

    /// Returns true for datatypes length and pattern facets may refine.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }
}

/// A node kind constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An IRI (absolute, bracketed or prefixed reference).
    Iri,
    /// A blank node (`_:` prefixed).
    BNode,
    /// A literal value (string, number or boolean).
    Literal,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri => f.write_str("IRI"),
            Self::BNode => f.write_str("BNODE"),
            Self::Literal => f.write_str("LITERAL"),
        }
    }
}

/// Cardinality constraint (min/max occurrences).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    /// Minimum number of values.
    pub min: u32,
    /// Maximum number of values, `None` meaning unbounded.
    pub max: Option<u32>,
}

impl Cardinality {
    /// Cardinality `?` (0 or 1).
    pub const OPTIONAL: Self = Self {
        min: 0,
        max: Some(1),
    };
    /// Cardinality `*` (0 or more).
    pub const STAR: Self = Self { min: 0, max: None };
    /// Cardinality `+` (1 or more).
    pub const PLUS: Self = Self { min: 1, max: None };
    /// Default cardinality (exactly one).
    pub const ONE: Self = Self {
        min: 1,
        max: Some(1),
    };

    /// Returns true if this cardinality allows the given value count.
    pub fn allows(&self, count: u32) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, None) => f.write_str("*"),
            (1, None) => f.write_str("+"),
            (0, Some(1)) => f.write_str("?"),
            (min, None) => write!(f, "{{{min},}}"),
            (min, Some(max)) if min == max => write!(f, "{{{min}}}"),
            (min, Some(max)) => write!(f, "{{{min},{max}}}"),
        }
    }
}

/// An additional restriction refining a value's acceptable form.
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    /// Minimum inclusive numeric value.
    MinInclusive(f64),
    /// Maximum inclusive numeric value.
    MaxInclusive(f64),
    /// Minimum string length, in code points.
    MinLength(usize),
    /// Maximum string length, in code points.
    MaxLength(usize),
    /// Regular-expression pattern the lexical form must match.
    Pattern(PatternFacet),
}

impl Facet {
    /// The schema keyword introducing this facet.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::MinInclusive(_) => "MININCLUSIVE",
            Self::MaxInclusive(_) => "MAXINCLUSIVE",
            Self::MinLength(_) => "MINLENGTH",
            Self::MaxLength(_) => "MAXLENGTH",
            Self::Pattern(_) => "PATTERN",
        }
    }

    /// Returns true for the numeric range facets.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::MinInclusive(_) | Self::MaxInclusive(_))
    }
}

/// A `PATTERN` facet with its regex compiled at parse time, so that facet
/// evaluation can never fail during validation.
#[derive(Debug, Clone)]
pub struct PatternFacet {
    pattern: String,
    regex: Regex,
}

impl PatternFacet {
    /// Compiles a pattern facet, failing on invalid regex syntax.
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = Regex::new(&pattern)?;
        Ok(Self { pattern, regex })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the given lexical form matches the pattern.
    pub fn is_match(&self, lexical: &str) -> bool {
        self.regex.is_match(lexical)
    }
}

impl PartialEq for PatternFacet {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_allows() {
        assert!(Cardinality::ONE.allows(1));
        assert!(!Cardinality::ONE.allows(0));
        assert!(!Cardinality::ONE.allows(2));
        assert!(Cardinality::OPTIONAL.allows(0));
        assert!(Cardinality::OPTIONAL.allows(1));
        assert!(!Cardinality::OPTIONAL.allows(2));
        assert!(Cardinality::STAR.allows(0));
        assert!(Cardinality::STAR.allows(100));
        assert!(!Cardinality::PLUS.allows(0));
        assert!(Cardinality::PLUS.allows(100));
    }

    #[test]
    fn test_cardinality_display() {
        assert_eq!(Cardinality::OPTIONAL.to_string(), "?");
        assert_eq!(Cardinality::STAR.to_string(), "*");
        assert_eq!(Cardinality::PLUS.to_string(), "+");
        assert_eq!(Cardinality::ONE.to_string(), "{1}");
    }

    #[test]
    fn test_datatype_from_iri() {
        assert_eq!(
            Datatype::from_iri("http://www.w3.org/2001/XMLSchema#integer"),
            Datatype::Integer
        );
        assert_eq!(
            Datatype::from_iri("http://example.org/custom"),
            Datatype::Other("http://example.org/custom".to_owned())
        );
    }

    #[test]
    fn test_datatype_classification() {
        assert!(Datatype::Integer.is_numeric());
        assert!(Datatype::Decimal.is_numeric());
        assert!(!Datatype::String.is_numeric());
        assert!(Datatype::String.is_string());
        assert!(!Datatype::Boolean.is_string());
    }

    #[test]
    fn test_schema_resolution() {
        let mut schema = Schema::new();
        schema.declare_prefix("ex", "http://example.org/");
        assert_eq!(
            schema.resolve("ex:name").as_deref(),
            Some("http://example.org/name")
        );
        assert_eq!(
            schema.resolve("<http://example.org/name>").as_deref(),
            Some("http://example.org/name")
        );
        assert_eq!(
            schema.resolve("http://example.org/name").as_deref(),
            Some("http://example.org/name")
        );
        assert_eq!(schema.resolve("unknown:name"), None);
    }

    #[test]
    fn test_duplicate_prefix_last_wins() {
        let mut schema = Schema::new();
        schema.declare_prefix("ex", "http://a.example/");
        schema.declare_prefix("ex", "http://b.example/");
        assert_eq!(schema.prefix("ex"), Some("http://b.example/"));
    }

    #[test]
    fn test_shape_insertion_order() {
        let mut schema = Schema::new();
        assert!(schema.insert_shape(Shape::new("<B>")));
        assert!(schema.insert_shape(Shape::new("<A>")));
        assert!(!schema.insert_shape(Shape::new("<B>")));
        let ids: Vec<_> = schema.shape_ids().collect();
        assert_eq!(ids, ["<B>", "<A>"]);
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_pattern_facet() {
        let facet = PatternFacet::new("^[A-Z]{3}$").expect("valid regex");
        assert!(facet.is_match("ABC"));
        assert!(!facet.is_match("abc"));
        assert!(PatternFacet::new("[").is_err());
    }

    #[test]
    fn test_schema_display_lists_shapes() {
        let mut schema = Schema::new();
        schema.declare_prefix("ex", "http://example.org/");
        let mut shape = Shape::new("<PersonShape>");
        shape.add_constraint(TripleConstraint::new(
            "http://example.org/name",
            ValueExpr::Datatype(Datatype::String),
        ));
        shape.set_closed(true);
        schema.insert_shape(shape);
        let rendered = schema.to_string();
        assert!(rendered.contains("PREFIX ex: <http://example.org/>"));
        assert!(rendered.contains("<PersonShape> [1 constraint(s), closed]"));
    }
}
