//! Recursive descent parser for the shape schema compact syntax.
//!
//! The grammar, in the order it is consumed:
//!
//! ```text
//! document    ::= prefixDecl* shapeDecl*
//! prefixDecl  ::= 'PREFIX' PNAME_NS IRIREF
//! shapeDecl   ::= IRIREF '{' constraints? '}' 'CLOSED'?
//! constraints ::= constraint (',' constraint)* ','?
//! constraint  ::= predicate valueExpr cardinality? facet* 'ADVISORY'?
//! predicate   ::= PNAME_LN | IRIREF
//! valueExpr   ::= PNAME_LN | IRIREF | 'IRI' | 'BNODE' | 'LITERAL' | '@' IRIREF
//! cardinality ::= '?' | '*' | '+'
//! facet       ::= ('MININCLUSIVE' | 'MAXINCLUSIVE') number
//!               | ('MINLENGTH' | 'MAXLENGTH') integer
//!               | 'PATTERN' string
//! ```
//!
//! Enforced policies:
//! - all `PREFIX` declarations must precede the first shape definition;
//! - shape identifiers are IRIREF tokens, stored verbatim with their angle
//!   brackets and never prefix-expanded;
//! - predicates and datatypes are expanded to full IRIs at parse time, so an
//!   undeclared prefix is a parse error, never deferred to validation;
//! - facets must be compatible with the constraint's value expression
//!   (numeric facets with numeric datatypes, length/pattern facets with
//!   `xsd:string`), and cannot apply to node kinds or shape references;
//! - `PATTERN` regexes are compiled here, so facet evaluation is total at
//!   validation time;
//! - a `@<Shape>` reference must name a shape defined somewhere in the
//!   document.

use crate::error::SchemaParseError;
use crate::lexer::{PositionedToken, Token, tokenize};
use crate::model::{
    Cardinality, Datatype, Facet, NodeKind, PatternFacet, Schema, Shape, TripleConstraint,
    ValueExpr,
};
use crate::report::Severity;
use oxiri::Iri;
use std::str::FromStr;

/// Parses a schema document into a [`Schema`].
pub fn parse_schema(text: &str) -> Result<Schema, SchemaParseError> {
    let tokens = tokenize(text)?;
    Parser::new(tokens).parse_document()
}

impl FromStr for Schema {
    type Err = SchemaParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_schema(text)
    }
}

struct Parser {
    tokens: Vec<PositionedToken>,
    cursor: usize,
    schema: Schema,
    /// Shape references seen so far, with the line of the referencing
    /// constraint, checked once the whole document is parsed.
    shape_refs: Vec<(String, u64)>,
}

impl Parser {
    fn new(tokens: Vec<PositionedToken>) -> Self {
        Self {
            tokens,
            cursor: 0,
            schema: Schema::new(),
            shape_refs: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|t| &t.token)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).map(|t| t.token.clone());
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// Line of the token about to be consumed, falling back to the last
    /// token's line at end of input.
    fn line(&self) -> u64 {
        self.tokens
            .get(self.cursor)
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.position.line)
    }

    fn error(&self, message: impl Into<String>) -> SchemaParseError {
        SchemaParseError::grammar(self.line(), message)
    }

    fn parse_document(mut self) -> Result<Schema, SchemaParseError> {
        while self.peek() == Some(&Token::Prefix) {
            self.parse_prefix_declaration()?;
        }
        while let Some(token) = self.peek() {
            match token {
                Token::Prefix => {
                    return Err(self.error(
                        "PREFIX declarations must appear before the first shape definition",
                    ));
                }
                Token::IriRef(_) => self.parse_shape()?,
                other => {
                    return Err(
                        self.error(format!("expected a shape definition, found {other}"))
                    );
                }
            }
        }
        for (reference, line) in &self.shape_refs {
            if self.schema.shape(reference).is_none() {
                return Err(SchemaParseError::grammar(
                    *line,
                    format!("reference to undefined shape {reference}"),
                ));
            }
        }
        Ok(self.schema)
    }

    fn parse_prefix_declaration(&mut self) -> Result<(), SchemaParseError> {
        self.next(); // PREFIX
        let label = match self.next() {
            Some(Token::PnameNs(label)) => label,
            Some(other) => {
                return Err(self.error(format!(
                    "expected a prefix label like 'ex:' after PREFIX, found {other}"
                )));
            }
            None => return Err(self.error("expected a prefix label after PREFIX")),
        };
        let iri = match self.next() {
            Some(Token::IriRef(iri)) => iri,
            Some(other) => {
                return Err(self.error(format!(
                    "expected a namespace IRI after 'PREFIX {label}:', found {other}"
                )));
            }
            None => {
                return Err(self.error(format!("expected a namespace IRI after 'PREFIX {label}:'")));
            }
        };
        Iri::parse(iri.as_str())
            .map_err(|e| self.error(format!("invalid namespace IRI <{iri}>: {e}")))?;
        self.schema.declare_prefix(label, iri);
        Ok(())
    }

    fn parse_shape(&mut self) -> Result<(), SchemaParseError> {
        let id_line = self.line();
        let Some(Token::IriRef(id)) = self.next() else {
            return Err(self.error("expected a shape identifier"));
        };
        // The shape identifier is the literal bracketed token
        let id = format!("<{id}>");
        if self.next() != Some(Token::CurlyOpen) {
            return Err(self.error(format!("expected '{{' after shape identifier {id}")));
        }
        let mut shape = Shape::new(&id);
        if self.peek() != Some(&Token::CurlyClose) {
            loop {
                shape.add_constraint(self.parse_constraint()?);
                if self.peek() == Some(&Token::Comma) {
                    self.next();
                    // Trailing separator before '}' is accepted
                    if self.peek() == Some(&Token::CurlyClose) {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        if self.next() != Some(Token::CurlyClose) {
            return Err(self.error(format!("expected '}}' closing shape {id}")));
        }
        if self.peek() == Some(&Token::Closed) {
            self.next();
            shape.set_closed(true);
        }
        if !self.schema.insert_shape(shape) {
            return Err(SchemaParseError::grammar(
                id_line,
                format!("shape {id} is already defined"),
            ));
        }
        Ok(())
    }

    fn parse_constraint(&mut self) -> Result<TripleConstraint, SchemaParseError> {
        let line = self.line();
        let predicate = match self.next() {
            Some(Token::PrefixedName { prefix, local }) => self.expand(&prefix, &local)?,
            Some(Token::IriRef(iri)) => iri,
            Some(other) => {
                return Err(self.error(format!("expected a predicate, found {other}")));
            }
            None => return Err(self.error("expected a predicate")),
        };
        let value_expr = self.parse_value_expr(&predicate, line)?;
        let mut constraint = TripleConstraint::new(&predicate, value_expr);
        if let Some(cardinality) = self.parse_cardinality() {
            constraint = constraint.with_cardinality(cardinality);
        }
        while let Some(facet) = self.parse_facet(&predicate)? {
            self.check_facet_compatibility(&facet, &constraint, &predicate)?;
            constraint = constraint.with_facet(facet);
        }
        if self.peek() == Some(&Token::Advisory) {
            self.next();
            constraint = constraint.with_severity(Severity::Warning);
        }
        Ok(constraint)
    }

    fn parse_value_expr(
        &mut self,
        predicate: &str,
        line: u64,
    ) -> Result<ValueExpr, SchemaParseError> {
        match self.next() {
            Some(Token::IriKind) => Ok(ValueExpr::NodeKind(NodeKind::Iri)),
            Some(Token::BNodeKind) => Ok(ValueExpr::NodeKind(NodeKind::BNode)),
            Some(Token::LiteralKind) => Ok(ValueExpr::NodeKind(NodeKind::Literal)),
            Some(Token::At) => match self.next() {
                Some(Token::IriRef(id)) => {
                    let id = format!("<{id}>");
                    self.shape_refs.push((id.clone(), line));
                    Ok(ValueExpr::ShapeRef(id))
                }
                _ => Err(self.error(format!(
                    "expected a shape identifier like @<Shape> after '@' for predicate {predicate}"
                ))),
            },
            Some(Token::PrefixedName { prefix, local }) => Ok(ValueExpr::Datatype(
                Datatype::from_iri(&self.expand(&prefix, &local)?),
            )),
            Some(Token::IriRef(iri)) => Ok(ValueExpr::Datatype(Datatype::from_iri(&iri))),
            Some(other) => Err(self.error(format!(
                "expected a value expression for predicate {predicate}, found {other}"
            ))),
            None => Err(self.error(format!(
                "expected a value expression for predicate {predicate}"
            ))),
        }
    }

    fn parse_cardinality(&mut self) -> Option<Cardinality> {
        let cardinality = match self.peek()? {
            Token::Question => Cardinality::OPTIONAL,
            Token::Star => Cardinality::STAR,
            Token::Plus => Cardinality::PLUS,
            _ => return None,
        };
        self.next();
        Some(cardinality)
    }

    fn parse_facet(&mut self, predicate: &str) -> Result<Option<Facet>, SchemaParseError> {
        let facet = match self.peek() {
            Some(Token::MinInclusive) => {
                self.next();
                Facet::MinInclusive(self.parse_number("MININCLUSIVE", predicate)?)
            }
            Some(Token::MaxInclusive) => {
                self.next();
                Facet::MaxInclusive(self.parse_number("MAXINCLUSIVE", predicate)?)
            }
            Some(Token::MinLength) => {
                self.next();
                Facet::MinLength(self.parse_length("MINLENGTH", predicate)?)
            }
            Some(Token::MaxLength) => {
                self.next();
                Facet::MaxLength(self.parse_length("MAXLENGTH", predicate)?)
            }
            Some(Token::Pattern) => {
                self.next();
                match self.next() {
                    Some(Token::StringLiteral(pattern)) => {
                        Facet::Pattern(PatternFacet::new(&pattern).map_err(|e| {
                            self.error(format!("invalid PATTERN regex \"{pattern}\": {e}"))
                        })?)
                    }
                    _ => {
                        return Err(self.error(format!(
                            "expected a quoted pattern after PATTERN for predicate {predicate}"
                        )));
                    }
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(facet))
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "facet bounds are compared as f64 during validation"
    )]
    fn parse_number(&mut self, keyword: &str, predicate: &str) -> Result<f64, SchemaParseError> {
        match self.next() {
            Some(Token::Integer(i)) => Ok(i as f64),
            Some(Token::Decimal(d)) => Ok(d),
            _ => Err(self.error(format!(
                "expected a numeric value after {keyword} for predicate {predicate}"
            ))),
        }
    }

    fn parse_length(&mut self, keyword: &str, predicate: &str) -> Result<usize, SchemaParseError> {
        if let Some(Token::Integer(i)) = self.next() {
            if let Ok(length) = usize::try_from(i) {
                return Ok(length);
            }
        }
        Err(self.error(format!(
            "expected a non-negative integer after {keyword} for predicate {predicate}"
        )))
    }

    fn check_facet_compatibility(
        &self,
        facet: &Facet,
        constraint: &TripleConstraint,
        predicate: &str,
    ) -> Result<(), SchemaParseError> {
        let compatible = match constraint.value_expr() {
            ValueExpr::Datatype(datatype) => {
                if facet.is_numeric() {
                    datatype.is_numeric()
                } else {
                    datatype.is_string()
                }
            }
            ValueExpr::NodeKind(_) | ValueExpr::ShapeRef(_) => false,
        };
        if compatible {
            Ok(())
        } else {
            Err(self.error(format!(
                "facet {} cannot apply to value expression {} of predicate {predicate}",
                facet.keyword(),
                constraint.value_expr()
            )))
        }
    }

    fn expand(&self, prefix: &str, local: &str) -> Result<String, SchemaParseError> {
        self.schema
            .resolve(&format!("{prefix}:{local}"))
            .ok_or_else(|| self.error(format!("undeclared prefix '{prefix}:' in {prefix}:{local}")))
    }
}
