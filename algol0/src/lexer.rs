//! Lexical analysis
//!
//! Scans source text into a flat token stream terminated by an
//! `EndOfStream` sentinel. The parser does its own scanning through the
//! grammar; this stream backs the `lex` dump and the identifier table.

use std::collections::BTreeMap;

use pest::Parser;
use tracing::debug;

use crate::parser::{error_offset, error_position, token_from_pair, token_kind, AlgolParser, Rule};
use crate::token::Token;
use crate::{CompileError, Result};

/// Lex the input into a vector of tokens ending with `EndOfStream`
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let pairs = AlgolParser::parse(Rule::tokens, source).map_err(|e| {
        let (line, column) = error_position(&e.line_col);
        let offset = error_offset(&e.location);
        CompileError::Lexical {
            line,
            column,
            message: describe_unexpected(&source[offset.min(source.len())..]),
        }
    })?;

    let mut tokens = Vec::new();
    for pair in pairs {
        let kind = token_kind(pair.as_rule())
            .ok_or_else(|| CompileError::malformed(format!("unexpected rule {:?}", pair.as_rule())))?;
        let mut token = token_from_pair(kind, &pair)?;
        if pair.as_rule() == Rule::EOI {
            token.literal = None;
        }
        tokens.push(token);
    }

    debug!(count = tokens.len(), "scanned tokens");
    Ok(tokens)
}

fn describe_unexpected(rest: &str) -> String {
    match rest.chars().next() {
        Some(c) => format!("unexpected character '{}'", c),
        None => "unexpected end of input".to_string(),
    }
}

/// Distinct identifiers sorted by name, each with its first occurrence
pub fn identifier_table(tokens: &[Token]) -> Vec<&Token> {
    let mut table: BTreeMap<String, &Token> = BTreeMap::new();
    for token in tokens {
        if token.kind == crate::token::TokenKind::VarName {
            table.entry(token.text()).or_insert(token);
        }
    }
    table.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenKind};

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_operators() {
        assert_eq!(
            kinds("begin x := 3 / 4 end"),
            vec![
                TokenKind::Beg,
                TokenKind::VarName,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Divide,
                TokenKind::Number,
                TokenKind::End,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_multi_character_comparisons() {
        assert_eq!(
            kinds("a >= b /= c <= d > e < f = g"),
            vec![
                TokenKind::VarName,
                TokenKind::GreaterEqual,
                TokenKind::VarName,
                TokenKind::Different,
                TokenKind::VarName,
                TokenKind::SmallerEqual,
                TokenKind::VarName,
                TokenKind::Greater,
                TokenKind::VarName,
                TokenKind::Smaller,
                TokenKind::VarName,
                TokenKind::Equal,
                TokenKind::VarName,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_end_keywords_are_distinct() {
        assert_eq!(
            kinds("end endif endwhile ending"),
            vec![
                TokenKind::End,
                TokenKind::EndIf,
                TokenKind::EndWhile,
                TokenKind::VarName,
                TokenKind::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("x // rest of line\n/* block\n comment */ y"),
            vec![TokenKind::VarName, TokenKind::VarName, TokenKind::EndOfStream]
        );
    }

    #[test]
    fn test_positions_and_literals() {
        let tokens = tokenize("begin\n  n := 12\nend").unwrap();
        let number = &tokens[3];
        assert_eq!(number.kind, TokenKind::Number);
        assert_eq!(number.literal, Some(Literal::Int(12)));
        assert_eq!((number.line, number.column), (2, 8));

        let eos = tokens.last().unwrap();
        assert_eq!(eos.kind, TokenKind::EndOfStream);
        assert_eq!(eos.literal, None);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("x := 1 # 2").unwrap_err();
        match err {
            CompileError::Lexical { line, column, message } => {
                assert_eq!((line, column), (1, 8));
                assert_eq!(message, "unexpected character '#'");
            }
            other => panic!("expected lexical error, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_table_sorted_and_deduplicated() {
        let tokens = tokenize("b := a; a := c; b := 1").unwrap();
        let names: Vec<String> = identifier_table(&tokens).iter().map(|t| t.text()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let first_b = identifier_table(&tokens)[1];
        assert_eq!(first_b.column, 1);
    }
}
