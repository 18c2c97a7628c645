//! Constraint validator.
//!
//! Evaluates candidate records against the shapes of a parsed [`Schema`],
//! producing one [`ValidationReport`] per record. Validation is pure and
//! synchronous: the only error path is looking up an unknown shape
//! identifier; everything wrong with the data itself becomes a violation in
//! the report.

use crate::error::ShapeValidationError;
use crate::model::{Datatype, Facet, NodeKind, Schema, TripleConstraint, ValueExpr};
use crate::record::{Record, Value};
use crate::report::{ValidationReport, Violation, ViolationKind};
use oxiri::Iri;
use oxsdatatypes::{Boolean, Date, DateTime, Decimal, Double, Integer};
use rustc_hash::FxHashSet;
use std::str::FromStr;

/// Validator for candidate records against a shape schema.
///
/// The schema is owned by the validator and never mutated, so a validator
/// can be shared across threads and reused for any number of records.
#[derive(Debug, Clone)]
pub struct ShapeValidator {
    schema: Schema,
}

impl ShapeValidator {
    /// Creates a new validator over the given schema.
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Returns a reference to the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validates a single record against the shape with the given verbatim
    /// identifier (e.g. `<PersonShape>`).
    ///
    /// Fails only when `shape_id` is not defined in the schema. Data-level
    /// problems are reported as violations, never as errors.
    pub fn validate(
        &self,
        record: &Record,
        shape_id: &str,
    ) -> Result<ValidationReport, ShapeValidationError> {
        let shape = self
            .schema
            .shape(shape_id)
            .ok_or_else(|| ShapeValidationError::unknown_shape(shape_id))?;

        let mut report = ValidationReport::new();
        if let Some(id) = record.id() {
            report = report.with_node_id(id);
        }

        // Record keys are resolved through the same function as the schema's
        // own predicates, so prefixed and fully-qualified keys compare equal
        let resolved: Vec<(&str, Option<String>)> = record
            .predicates()
            .map(|key| (key, self.schema.resolve(key)))
            .collect();
        let mut matched = FxHashSet::default();

        for constraint in shape.expression() {
            report.note_checked();
            let mut values: Vec<&Value> = Vec::new();
            for (key, resolved_key) in &resolved {
                if resolved_key.as_deref() == Some(constraint.predicate()) {
                    matched.insert(*key);
                    values.extend(record.values(key));
                }
            }
            self.check_constraint(constraint, &values, &mut report);
        }

        if shape.closed() {
            report.note_checked();
            for (key, _) in &resolved {
                if !matched.contains(*key) {
                    report.add_violation(
                        Violation::new(
                            ViolationKind::Closed,
                            *key,
                            format!("unexpected property {key} on closed shape {}", shape.id()),
                        )
                        .with_fix_suggestion(format!(
                            "remove {key} or declare it in {}",
                            shape.id()
                        )),
                    );
                }
            }
        }

        Ok(report)
    }

    /// Validates a batch of records against the same shape.
    ///
    /// Returns one report per record, in input order. Records are fully
    /// independent: the outcome for one never affects another.
    pub fn validate_batch(
        &self,
        records: &[Record],
        shape_id: &str,
    ) -> Result<Vec<ValidationReport>, ShapeValidationError> {
        records
            .iter()
            .map(|record| self.validate(record, shape_id))
            .collect()
    }

    fn check_constraint(
        &self,
        constraint: &TripleConstraint,
        values: &[&Value],
        report: &mut ValidationReport,
    ) {
        let count = u32::try_from(values.len()).unwrap_or(u32::MAX);
        let cardinality = constraint.cardinality();
        if !cardinality.allows(count) {
            let predicate = constraint.predicate();
            let expected = match (cardinality.min, cardinality.max) {
                (min, Some(max)) if min == max => format!("exactly {min}"),
                (min, None) => format!("at least {min}"),
                (0, Some(max)) => format!("at most {max}"),
                (min, Some(max)) => format!("between {min} and {max}"),
            };
            let suggestion = if count < cardinality.min {
                format!(
                    "add {} value(s) for {predicate}",
                    cardinality.min - count
                )
            } else {
                let max = cardinality.max.unwrap_or(count);
                format!("remove {} value(s) from {predicate}", count - max)
            };
            report.add_violation(
                Violation::new(
                    ViolationKind::Cardinality,
                    predicate,
                    format!("expected {expected} value(s), found {count}"),
                )
                .with_severity(constraint.severity())
                .with_fix_suggestion(suggestion),
            );
        }

        for value in values {
            if let Some(violation) = self.check_value_expr(constraint, value) {
                report.add_violation(violation.with_severity(constraint.severity()));
            }
            for facet in constraint.facets() {
                if let Some(violation) = check_facet(constraint.predicate(), facet, value) {
                    report.add_violation(violation.with_severity(constraint.severity()));
                }
            }
        }
    }

    fn check_value_expr(&self, constraint: &TripleConstraint, value: &Value) -> Option<Violation> {
        let predicate = constraint.predicate();
        match constraint.value_expr() {
            ValueExpr::Datatype(datatype) => {
                if matches_datatype(datatype, value) {
                    None
                } else {
                    let iri = datatype.iri();
                    Some(
                        Violation::new(
                            ViolationKind::Datatype,
                            predicate,
                            format!("value {value} is not a valid {iri}"),
                        )
                        .with_fix_suggestion(format!("convert the value to {iri}")),
                    )
                }
            }
            ValueExpr::NodeKind(kind) => {
                if self.node_kind_matches(*kind, value) {
                    None
                } else {
                    let suggestion = match kind {
                        NodeKind::Iri => "use an IRI reference instead of a literal",
                        NodeKind::BNode => "use a blank node identifier like _:b0",
                        NodeKind::Literal => "use a literal value instead of a reference",
                    };
                    Some(
                        Violation::new(
                            ViolationKind::NodeKind,
                            predicate,
                            format!("value {value} is not of node kind {kind}"),
                        )
                        .with_fix_suggestion(suggestion),
                    )
                }
            }
            ValueExpr::ShapeRef(shape_id) => {
                if self.is_reference(value) {
                    None
                } else {
                    Some(
                        Violation::new(
                            ViolationKind::Datatype,
                            predicate,
                            format!("value {value} is not a reference to a {shape_id} node"),
                        )
                        .with_fix_suggestion(format!(
                            "replace the value with a reference to a node conforming to {shape_id}"
                        )),
                    )
                }
            }
        }
    }

    fn node_kind_matches(&self, kind: NodeKind, value: &Value) -> bool {
        match kind {
            NodeKind::Iri => self.is_reference(value),
            NodeKind::BNode => match value {
                Value::String(s) | Value::Iri(s) => s.starts_with("_:"),
                Value::Number(_) | Value::Boolean(_) => false,
            },
            NodeKind::Literal => value.is_literal(),
        }
    }

    /// A value counts as a reference when it is tagged as one, or when it is
    /// a string shaped like a bracketed, absolute or declared-prefix
    /// reference. Quoted literals that look like plain words never qualify.
    fn is_reference(&self, value: &Value) -> bool {
        match value {
            Value::Iri(_) => true,
            Value::String(s) => {
                if s.starts_with('<') && s.ends_with('>') {
                    return true;
                }
                if Iri::parse(s.as_str()).is_ok() {
                    return true;
                }
                s.split_once(':').is_some_and(|(prefix, local)| {
                    !local.starts_with("//") && self.schema.prefix(prefix).is_some()
                })
            }
            Value::Number(_) | Value::Boolean(_) => false,
        }
    }
}

/// Total datatype compatibility check: string lexical forms are coerced to
/// the target kind, numbers and booleans only match the kinds they can
/// represent exactly. Never fails.
fn matches_datatype(datatype: &Datatype, value: &Value) -> bool {
    match datatype {
        Datatype::String => matches!(value, Value::String(_)),
        Datatype::Integer => match value {
            Value::Number(n) => n.is_finite() && n.fract() == 0.0,
            Value::String(s) => Integer::from_str(s).is_ok(),
            Value::Boolean(_) | Value::Iri(_) => false,
        },
        Datatype::Decimal => match value {
            Value::Number(n) => n.is_finite(),
            Value::String(s) => Decimal::from_str(s).is_ok(),
            Value::Boolean(_) | Value::Iri(_) => false,
        },
        Datatype::Double => match value {
            Value::Number(_) => true,
            Value::String(s) => Double::from_str(s).is_ok(),
            Value::Boolean(_) | Value::Iri(_) => false,
        },
        Datatype::Boolean => match value {
            Value::Boolean(_) => true,
            Value::String(s) => Boolean::from_str(s).is_ok(),
            Value::Number(_) | Value::Iri(_) => false,
        },
        Datatype::Date => matches!(value, Value::String(s) if Date::from_str(s).is_ok()),
        Datatype::DateTime => matches!(value, Value::String(s) if DateTime::from_str(s).is_ok()),
        Datatype::AnyUri => match value {
            Value::Iri(_) => true,
            Value::String(s) => Iri::parse(s.as_str()).is_ok(),
            Value::Number(_) | Value::Boolean(_) => false,
        },
        Datatype::Other(_) => value.is_literal(),
    }
}

/// The numeric interpretation of a value for range facets. Non-numeric
/// values return `None` and are left to the datatype check.
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::String(s) => s.parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn check_facet(predicate: &str, facet: &Facet, value: &Value) -> Option<Violation> {
    match facet {
        Facet::MinInclusive(min) => {
            let n = numeric_value(value)?;
            (n < *min).then(|| {
                Violation::new(
                    ViolationKind::Range,
                    predicate,
                    format!("value {n} is below the minimum {min}"),
                )
                .with_fix_suggestion(format!("use a value of at least {min}"))
            })
        }
        Facet::MaxInclusive(max) => {
            let n = numeric_value(value)?;
            (n > *max).then(|| {
                Violation::new(
                    ViolationKind::Range,
                    predicate,
                    format!("value {n} exceeds the maximum {max}"),
                )
                .with_fix_suggestion(format!("use a value of at most {max}"))
            })
        }
        Facet::MinLength(min) => {
            let length = value.lexical_form().chars().count();
            (length < *min).then(|| {
                Violation::new(
                    ViolationKind::Length,
                    predicate,
                    format!("length {length} is less than MINLENGTH {min}"),
                )
                .with_fix_suggestion(format!("provide at least {min} character(s)"))
            })
        }
        Facet::MaxLength(max) => {
            let length = value.lexical_form().chars().count();
            (length > *max).then(|| {
                Violation::new(
                    ViolationKind::Length,
                    predicate,
                    format!("length {length} exceeds MAXLENGTH {max}"),
                )
                .with_fix_suggestion(format!("shorten the value to at most {max} character(s)"))
            })
        }
        Facet::Pattern(pattern) => {
            let lexical = value.lexical_form();
            (!pattern.is_match(&lexical)).then(|| {
                Violation::new(
                    ViolationKind::Pattern,
                    predicate,
                    format!("value {value} does not match pattern \"{}\"", pattern.pattern()),
                )
                .with_fix_suggestion(format!(
                    "use a value matching \"{}\"",
                    pattern.pattern()
                ))
            })
        }
    }
}
