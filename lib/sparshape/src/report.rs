//! Validation report types.
//!
//! A [`ValidationReport`] aggregates the [`Violation`]s found while checking
//! one candidate record against a shape. Reports are plain data: they are
//! independently owned by the caller and never feed back into the schema or
//! the validator.

use std::fmt;

/// Severity level of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Severity {
    /// A hard failure. Any error violation makes the report invalid.
    #[default]
    Error,
    /// An advisory notice. Warnings never affect validity.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
            Self::Warning => f.write_str("WARNING"),
        }
    }
}

/// The kind of rule a violation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum ViolationKind {
    /// Too few or too many values for a predicate.
    Cardinality,
    /// A value is not convertible to the declared datatype, or does not
    /// reference a node of the declared shape.
    Datatype,
    /// A value's lexical form does not match the declared pattern.
    Pattern,
    /// A numeric value is outside the declared inclusive range.
    Range,
    /// A lexical form is outside the declared length range.
    Length,
    /// A value is not of the declared node kind.
    NodeKind,
    /// A property not declared by a closed shape.
    Closed,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cardinality => f.write_str("CARDINALITY"),
            Self::Datatype => f.write_str("DATATYPE"),
            Self::Pattern => f.write_str("PATTERN"),
            Self::Range => f.write_str("RANGE"),
            Self::Length => f.write_str("LENGTH"),
            Self::NodeKind => f.write_str("NODEKIND"),
            Self::Closed => f.write_str("CLOSED"),
        }
    }
}

/// One failed rule instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Violation {
    /// The kind of rule that failed.
    #[cfg_attr(feature = "serde", serde(rename = "violation_type"))]
    pub kind: ViolationKind,

    /// The predicate the rule applies to, as written in the schema or the
    /// record.
    pub predicate: String,

    /// Human-readable description of the failure.
    pub message: String,

    /// Severity of this violation.
    pub severity: Severity,

    /// An advisory remediation hint. Never applied automatically.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fix_suggestion: Option<String>,
}

impl Violation {
    /// Creates a new error-severity violation.
    pub fn new(
        kind: ViolationKind,
        predicate: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            predicate: predicate.into(),
            message: message.into(),
            severity: Severity::Error,
            fix_suggestion: None,
        }
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attaches a fix suggestion.
    #[must_use]
    pub fn with_fix_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.fix_suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} on {}: {}",
            self.severity, self.kind, self.predicate, self.message
        )?;
        if let Some(suggestion) = &self.fix_suggestion {
            write!(f, " (hint: {suggestion})")?;
        }
        Ok(())
    }
}

/// The outcome of validating one candidate record against a shape.
///
/// Violations are ordered by the declaration order of the constraint that
/// produced them, closed-shape violations last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    node_id: Option<String>,
    violations: Vec<Violation>,
    checked_constraints: usize,
}

impl ValidationReport {
    /// Creates a new empty (valid) report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the caller-supplied node identifier.
    #[must_use]
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// True iff the report holds no error-severity violation.
    pub fn is_valid(&self) -> bool {
        !self
            .violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// The violations, in report order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of error-severity violations.
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity violations.
    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// Number of constraints evaluated while producing this report.
    pub fn checked_constraints(&self) -> usize {
        self.checked_constraints
    }

    /// The caller-supplied node identifier, if any.
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Records that one more constraint was evaluated.
    pub(crate) fn note_checked(&mut self) {
        self.checked_constraints += 1;
    }

    /// Merges another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
        self.checked_constraints += other.checked_constraints;
    }

    /// Returns true if there is no violation of any severity.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    /// Stable rendering: a summary line, then one line per violation,
    /// errors first, then warnings, each group in report order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.node_id.as_deref().unwrap_or("record");
        if self.is_valid() {
            write!(f, "{target}: valid")?;
        } else {
            write!(f, "{target}: invalid")?;
        }
        write!(
            f,
            " ({} error(s), {} warning(s), {} constraint(s) checked)",
            self.error_count(),
            self.warning_count(),
            self.checked_constraints
        )?;
        for severity in [Severity::Error, Severity::Warning] {
            for violation in self.violations.iter().filter(|v| v.severity == severity) {
                write!(f, "\n  {violation}")?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValidationReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ValidationReport", 6)?;
        s.serialize_field("is_valid", &self.is_valid())?;
        s.serialize_field("node_id", &self.node_id)?;
        s.serialize_field("error_count", &self.error_count())?;
        s.serialize_field("warning_count", &self.warning_count())?;
        s.serialize_field("checked_constraints", &self.checked_constraints)?;
        s.serialize_field("violations", &self.violations)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cardinality_violation() -> Violation {
        Violation::new(
            ViolationKind::Cardinality,
            "http://example.org/name",
            "requires at least 1 value(s), found 0",
        )
        .with_fix_suggestion("add a value for http://example.org/name")
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(report.is_empty());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_error_violation_invalidates() {
        let mut report = ValidationReport::new();
        report.add_violation(cardinality_violation());
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn test_warning_does_not_invalidate() {
        let mut report = ValidationReport::new();
        report.add_violation(cardinality_violation().with_severity(Severity::Warning));
        assert!(report.is_valid());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn test_merge() {
        let mut report = ValidationReport::new();
        let mut other = ValidationReport::new();
        other.add_violation(cardinality_violation());
        other.note_checked();
        report.merge(other);
        assert!(!report.is_valid());
        assert_eq!(report.checked_constraints(), 1);
    }

    #[test]
    fn test_display_groups_errors_before_warnings() {
        let mut report = ValidationReport::new().with_node_id("n1");
        report.add_violation(
            Violation::new(ViolationKind::Length, "ex:a", "too long")
                .with_severity(Severity::Warning),
        );
        report.add_violation(Violation::new(ViolationKind::Range, "ex:b", "out of range"));
        let rendered = report.to_string();
        assert!(rendered.starts_with("n1: invalid"));
        let range_at = rendered.find("RANGE").expect("range line");
        let length_at = rendered.find("LENGTH").expect("length line");
        assert!(range_at < length_at, "errors must be rendered first");
    }

    #[test]
    fn test_violation_display_includes_hint() {
        let rendered = cardinality_violation().to_string();
        assert!(rendered.starts_with("[ERROR] CARDINALITY on http://example.org/name"));
        assert!(rendered.contains("hint: add a value"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ViolationKind::NodeKind.to_string(), "NODEKIND");
        assert_eq!(ViolationKind::Closed.to_string(), "CLOSED");
    }
}
