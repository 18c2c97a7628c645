//! Shape schema validation for flat property records.
//!
//! This crate parses a compact, ShEx-style schema describing what records of
//! a given type must look like, and validates candidate records against
//! those shapes, producing severity-tagged violation reports with actionable
//! fix suggestions.
//!
//! # Core Concepts
//!
//! - **Schema**: prefix declarations plus named shapes ([`Schema`])
//! - **Shape**: one node type, an ordered list of property rules ([`Shape`])
//! - **Record**: a flat predicate-to-values mapping ([`Record`])
//! - **Validation**: checking records against shapes ([`ShapeValidator`])
//! - **Report**: the per-record outcome ([`ValidationReport`])
//!
//! # Quick Start
//!
//! ```
//! use sparshape::{Record, ShapeValidator, parse_schema};
//!
//! let schema = parse_schema(
//!     r#"
//!     PREFIX ex: <http://example.org/>
//!     PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
//!
//!     <PersonShape> {
//!         ex:name xsd:string,
//!         ex:age xsd:integer MININCLUSIVE 0 MAXINCLUSIVE 150
//!     }
//!     "#,
//! )?;
//!
//! let validator = ShapeValidator::new(schema);
//!
//! let mut record = Record::new();
//! record.insert("ex:name", "Alice");
//! record.insert("ex:age", 30_i64);
//!
//! let report = validator.validate(&record, "<PersonShape>")?;
//! assert!(report.is_valid());
//! # Ok::<_, sparshape::ShapeError>(())
//! ```
//!
//! Validation never fails on bad data: everything wrong with a record shows
//! up as a [`Violation`] inside the report, so batches run to completion
//! over large record sets even when most records are invalid. The only
//! error paths are malformed schema text and unknown shape identifiers.
//!
//! A [`Schema`] is immutable after parsing and can be shared read-only
//! across concurrent validations.

#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod lexer;
mod model;
mod parser;
mod record;
mod report;
mod validator;


pub use error::{
    SchemaParseError, SchemaSyntaxError, ShapeError, ShapeValidationError, TextPosition,
};
pub use lexer::{PositionedToken, Token, tokenize};
pub use model::{
    Cardinality, Datatype, Facet, NodeKind, PatternFacet, Schema, Shape, TripleConstraint,
    ValueExpr, XSD_NS,
};
pub use parser::parse_schema;
pub use record::{Record, Value};
pub use report::{Severity, ValidationReport, Violation, ViolationKind};
pub use validator::ShapeValidator;
