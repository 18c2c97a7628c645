//! Tokenizer for the shape schema compact syntax.
//!
//! Converts raw schema text into a flat token stream consumed by the
//! [parser](crate::parse_schema). Whitespace and `#` line comments are
//! skipped. Every token carries the [`TextPosition`] of its first byte.

use crate::error::{SchemaSyntaxError, TextPosition};
use std::fmt;

/// A single token of the schema compact syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `PREFIX` keyword (case-insensitive).
    Prefix,
    /// `CLOSED` keyword.
    Closed,
    /// `ADVISORY` keyword.
    Advisory,
    /// `MININCLUSIVE` facet keyword.
    MinInclusive,
    /// `MAXINCLUSIVE` facet keyword.
    MaxInclusive,
    /// `MINLENGTH` facet keyword.
    MinLength,
    /// `MAXLENGTH` facet keyword.
    MaxLength,
    /// `PATTERN` facet keyword.
    Pattern,
    /// `IRI` node kind keyword.
    IriKind,
    /// `BNODE` node kind keyword.
    BNodeKind,
    /// `LITERAL` node kind keyword.
    LiteralKind,
    /// An IRI reference (`<...>`), angle brackets stripped.
    IriRef(String),
    /// A prefixed name (`prefix:local`).
    PrefixedName {
        /// The prefix label, possibly empty.
        prefix: String,
        /// The local part, possibly empty.
        local: String,
    },
    /// A lone prefix label (`prefix:`), as used in `PREFIX` declarations.
    PnameNs(String),
    /// `{`
    CurlyOpen,
    /// `}`
    CurlyClose,
    /// `,`
    Comma,
    /// `@`
    At,
    /// `?` cardinality marker.
    Question,
    /// `*` cardinality marker.
    Star,
    /// `+` cardinality marker.
    Plus,
    /// A quoted string literal, escapes resolved.
    StringLiteral(String),
    /// An integer literal.
    Integer(i64),
    /// A decimal literal.
    Decimal(f64),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => f.write_str("PREFIX"),
            Self::Closed => f.write_str("CLOSED"),
            Self::Advisory => f.write_str("ADVISORY"),
            Self::MinInclusive => f.write_str("MININCLUSIVE"),
            Self::MaxInclusive => f.write_str("MAXINCLUSIVE"),
            Self::MinLength => f.write_str("MINLENGTH"),
            Self::MaxLength => f.write_str("MAXLENGTH"),
            Self::Pattern => f.write_str("PATTERN"),
            Self::IriKind => f.write_str("IRI"),
            Self::BNodeKind => f.write_str("BNODE"),
            Self::LiteralKind => f.write_str("LITERAL"),
            Self::IriRef(iri) => write!(f, "<{iri}>"),
            Self::PrefixedName { prefix, local } => write!(f, "{prefix}:{local}"),
            Self::PnameNs(prefix) => write!(f, "{prefix}:"),
            Self::CurlyOpen => f.write_str("'{'"),
            Self::CurlyClose => f.write_str("'}'"),
            Self::Comma => f.write_str("','"),
            Self::At => f.write_str("'@'"),
            Self::Question => f.write_str("'?'"),
            Self::Star => f.write_str("'*'"),
            Self::Plus => f.write_str("'+'"),
            Self::StringLiteral(s) => write!(f, "\"{s}\""),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
        }
    }
}

/// A token together with the position of its first byte.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    /// The token.
    pub token: Token,
    /// Position of the first byte of the token.
    pub position: TextPosition,
}

/// Tokenizes a full schema text.
///
/// Total over the input: either every byte is consumed into the returned
/// token stream or a [`SchemaSyntaxError`] pinpoints the first offending
/// position (unterminated string or IRI reference, invalid escape, invalid
/// character).
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken>, SchemaSyntaxError> {
    let mut scanner = Scanner::new(input);
    let mut tokens = Vec::new();
    loop {
        scanner.skip_whitespace_and_comments();
        let position = scanner.position;
        let Some(c) = scanner.peek() else {
            return Ok(tokens);
        };
        let token = match c {
            '{' => scanner.single(Token::CurlyOpen),
            '}' => scanner.single(Token::CurlyClose),
            ',' => scanner.single(Token::Comma),
            '@' => scanner.single(Token::At),
            '?' => scanner.single(Token::Question),
            '*' => scanner.single(Token::Star),
            '+' => scanner.single(Token::Plus),
            '<' => scanner.iri_ref()?,
            '"' => scanner.string_literal()?,
            ':' => scanner.pname(String::new()),
            c if c.is_ascii_digit() || c == '-' => scanner.number()?,
            c if c.is_alphabetic() || c == '_' => scanner.word()?,
            c => {
                return Err(SchemaSyntaxError::new(
                    position,
                    format!("invalid character '{c}'"),
                ));
            }
        };
        tokens.push(PositionedToken { token, position });
    }
}

struct Scanner<'a> {
    input: &'a str,
    cursor: usize,
    position: TextPosition,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            position: TextPosition::default(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.cursor..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        self.position.offset += c.len_utf8() as u64;
        if c == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
        Some(c)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn iri_ref(&mut self) -> Result<Token, SchemaSyntaxError> {
        let start = self.position;
        self.bump(); // '<'
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => return Ok(Token::IriRef(iri)),
                Some('\n') | None => {
                    return Err(SchemaSyntaxError::new(start, "unterminated IRI reference"));
                }
                Some(c) => iri.push(c),
            }
        }
    }

    fn string_literal(&mut self) -> Result<Token, SchemaSyntaxError> {
        let start = self.position;
        self.bump(); // '"'
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::StringLiteral(value)),
                Some('\\') => {
                    let escape_position = self.position;
                    match self.bump() {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some(c) => {
                            return Err(SchemaSyntaxError::new(
                                escape_position,
                                format!("invalid escape sequence '\\{c}'"),
                            ));
                        }
                        None => {
                            return Err(SchemaSyntaxError::new(
                                start,
                                "unterminated string literal",
                            ));
                        }
                    }
                }
                Some('\n') | None => {
                    return Err(SchemaSyntaxError::new(start, "unterminated string literal"));
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Token, SchemaSyntaxError> {
        let start = self.position;
        let mut lexical = String::new();
        if self.peek() == Some('-') {
            lexical.push('-');
            self.bump();
        }
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(SchemaSyntaxError::new(
                start,
                "expected a digit after '-'".to_owned(),
            ));
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            lexical.push(self.bump().unwrap_or_default());
        }
        // A '.' is part of the number only when followed by a digit
        if self.peek() == Some('.')
            && self.input[self.cursor + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        {
            lexical.push('.');
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                lexical.push(self.bump().unwrap_or_default());
            }
            let value = lexical.parse::<f64>().map_err(|e| {
                SchemaSyntaxError::new(start, format!("invalid decimal literal '{lexical}': {e}"))
            })?;
            Ok(Token::Decimal(value))
        } else {
            let value = lexical.parse::<i64>().map_err(|e| {
                SchemaSyntaxError::new(start, format!("invalid integer literal '{lexical}': {e}"))
            })?;
            Ok(Token::Integer(value))
        }
    }

    fn word(&mut self) -> Result<Token, SchemaSyntaxError> {
        let start = self.position;
        let mut word = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            word.push(self.bump().unwrap_or_default());
        }
        if self.peek() == Some(':') {
            self.bump();
            return Ok(self.pname_local(word));
        }
        if word.eq_ignore_ascii_case("PREFIX") {
            return Ok(Token::Prefix);
        }
        match word.as_str() {
            "CLOSED" => Ok(Token::Closed),
            "ADVISORY" => Ok(Token::Advisory),
            "MININCLUSIVE" => Ok(Token::MinInclusive),
            "MAXINCLUSIVE" => Ok(Token::MaxInclusive),
            "MINLENGTH" => Ok(Token::MinLength),
            "MAXLENGTH" => Ok(Token::MaxLength),
            "PATTERN" => Ok(Token::Pattern),
            "IRI" => Ok(Token::IriKind),
            "BNODE" => Ok(Token::BNodeKind),
            "LITERAL" => Ok(Token::LiteralKind),
            _ => Err(SchemaSyntaxError::new(
                start,
                format!("unexpected identifier '{word}'"),
            )),
        }
    }

    fn pname(&mut self, prefix: String) -> Token {
        self.bump(); // ':'
        self.pname_local(prefix)
    }

    fn pname_local(&mut self, prefix: String) -> Token {
        let mut local = String::new();
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            local.push(self.bump().unwrap_or_default());
        }
        if local.is_empty() {
            Token::PnameNs(prefix)
        } else {
            Token::PrefixedName { prefix, local }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenization should succeed")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_prefix_declaration() {
        assert_eq!(
            tokens("PREFIX ex: <http://example.org/>"),
            vec![
                Token::Prefix,
                Token::PnameNs("ex".to_owned()),
                Token::IriRef("http://example.org/".to_owned()),
            ]
        );
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert_eq!(tokens("prefix")[0], Token::Prefix);
        assert_eq!(tokens("Prefix")[0], Token::Prefix);
    }

    #[test]
    fn test_shape_with_constraints() {
        assert_eq!(
            tokens("<PersonShape> { ex:name xsd:string, ex:age xsd:integer + }"),
            vec![
                Token::IriRef("PersonShape".to_owned()),
                Token::CurlyOpen,
                Token::PrefixedName {
                    prefix: "ex".to_owned(),
                    local: "name".to_owned(),
                },
                Token::PrefixedName {
                    prefix: "xsd".to_owned(),
                    local: "string".to_owned(),
                },
                Token::Comma,
                Token::PrefixedName {
                    prefix: "ex".to_owned(),
                    local: "age".to_owned(),
                },
                Token::PrefixedName {
                    prefix: "xsd".to_owned(),
                    local: "integer".to_owned(),
                },
                Token::Plus,
                Token::CurlyClose,
            ]
        );
    }

    #[test]
    fn test_facets_and_numbers() {
        assert_eq!(
            tokens("MININCLUSIVE -5 MAXINCLUSIVE 1.5"),
            vec![
                Token::MinInclusive,
                Token::Integer(-5),
                Token::MaxInclusive,
                Token::Decimal(1.5),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\\c\nd""#),
            vec![Token::StringLiteral("a\"b\\c\nd".to_owned())]
        );
    }

    #[test]
    fn test_comments_and_whitespace_are_skipped() {
        assert_eq!(
            tokens("# a comment\n  <S> # trailing\n{}"),
            vec![
                Token::IriRef("S".to_owned()),
                Token::CurlyOpen,
                Token::CurlyClose,
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("").is_empty());
        assert!(tokens("   \n\t # only a comment").is_empty());
    }

    #[test]
    fn test_unterminated_string() {
        let error = tokenize("\"abc").expect_err("should fail");
        assert_eq!(error.position().line, 0);
        assert_eq!(error.position().column, 0);
        assert!(error.message().contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_iri() {
        let error = tokenize("<http://example.org/\n").expect_err("should fail");
        assert!(error.message().contains("unterminated IRI"));
    }

    #[test]
    fn test_invalid_character() {
        let error = tokenize("<S> { ^ }").expect_err("should fail");
        assert_eq!(error.position().column, 6);
        assert!(error.message().contains("invalid character '^'"));
    }

    #[test]
    fn test_error_position_tracks_lines_and_offsets() {
        let error = tokenize("PREFIX ex: <http://example.org/>\n  %").expect_err("should fail");
        assert_eq!(error.position().line, 1);
        assert_eq!(error.position().column, 2);
        assert_eq!(error.position().offset, 35);
    }

    #[test]
    fn test_non_ascii_content() {
        assert_eq!(
            tokens("\"caf\u{e9}\""),
            vec![Token::StringLiteral("caf\u{e9}".to_owned())]
        );
    }

    #[test]
    fn test_node_kind_keywords() {
        assert_eq!(
            tokens("IRI BNODE LITERAL"),
            vec![Token::IriKind, Token::BNodeKind, Token::LiteralKind]
        );
    }

    #[test]
    fn test_unknown_bare_identifier_is_rejected() {
        let error = tokenize("<S> { name }").expect_err("should fail");
        assert!(error.message().contains("unexpected identifier 'name'"));
    }
}
