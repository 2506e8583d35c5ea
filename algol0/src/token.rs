//! Lexical units
//!
//! The closed set of token categories produced by the scanner, plus the token
//! value itself. Every token remembers where it came from so later stages can
//! point diagnostics back at the source.

use std::fmt;

use serde::Serialize;

/// Token categories of the ALGOL-0 language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    VarName,
    Number,
    Beg,
    End,
    Semicolon,
    Assign,
    LeftParenthesis,
    RightParenthesis,
    Minus,
    Plus,
    Times,
    Divide,
    If,
    Then,
    EndIf,
    Else,
    Not,
    And,
    Or,
    Equal,
    GreaterEqual,
    Greater,
    SmallerEqual,
    Smaller,
    Different,
    While,
    Do,
    EndWhile,
    For,
    From,
    By,
    To,
    Print,
    Read,
    EndOfStream,
}

impl TokenKind {
    /// Upper-case unit name used in token dumps (`VARNAME`, `GREATER_EQUAL`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::VarName => "VARNAME",
            TokenKind::Number => "NUMBER",
            TokenKind::Beg => "BEG",
            TokenKind::End => "END",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Assign => "ASSIGN",
            TokenKind::LeftParenthesis => "LEFT_PARENTHESIS",
            TokenKind::RightParenthesis => "RIGHT_PARENTHESIS",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::EndIf => "ENDIF",
            TokenKind::Else => "ELSE",
            TokenKind::Not => "NOT",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Equal => "EQUAL",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::SmallerEqual => "SMALLER_EQUAL",
            TokenKind::Smaller => "SMALLER",
            TokenKind::Different => "DIFFERENT",
            TokenKind::While => "WHILE",
            TokenKind::Do => "DO",
            TokenKind::EndWhile => "ENDWHILE",
            TokenKind::For => "FOR",
            TokenKind::From => "FROM",
            TokenKind::By => "BY",
            TokenKind::To => "TO",
            TokenKind::Print => "PRINT",
            TokenKind::Read => "READ",
            TokenKind::EndOfStream => "END_OF_STREAM",
        }
    }

    /// How the category is spelled in "expected ..." messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::VarName => "identifier",
            TokenKind::Number => "number",
            TokenKind::Beg => "`begin`",
            TokenKind::End => "`end`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Assign => "`:=`",
            TokenKind::LeftParenthesis => "`(`",
            TokenKind::RightParenthesis => "`)`",
            TokenKind::Minus => "`-`",
            TokenKind::Plus => "`+`",
            TokenKind::Times => "`*`",
            TokenKind::Divide => "`/`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::EndIf => "`endif`",
            TokenKind::Else => "`else`",
            TokenKind::Not => "`not`",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Equal => "`=`",
            TokenKind::GreaterEqual => "`>=`",
            TokenKind::Greater => "`>`",
            TokenKind::SmallerEqual => "`<=`",
            TokenKind::Smaller => "`<`",
            TokenKind::Different => "`/=`",
            TokenKind::While => "`while`",
            TokenKind::Do => "`do`",
            TokenKind::EndWhile => "`endwhile`",
            TokenKind::For => "`for`",
            TokenKind::From => "`from`",
            TokenKind::By => "`by`",
            TokenKind::To => "`to`",
            TokenKind::Print => "`print`",
            TokenKind::Read => "`read`",
            TokenKind::EndOfStream => "end of input",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::Different
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::Smaller
                | TokenKind::SmallerEqual
        )
    }

    /// Operators that can head an expression or condition subtree
    pub fn is_operator(&self) -> bool {
        self.is_comparison()
            || matches!(
                self,
                TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Times
                    | TokenKind::Divide
                    | TokenKind::And
                    | TokenKind::Or
                    | TokenKind::Not
            )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Literal payload of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Text(String),
    Int(i32),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(text) => f.write_str(text),
            Literal::Int(value) => write!(f, "{}", value),
        }
    }
}

/// A classified lexeme with its 1-based source position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Option<Literal>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: Option<Literal>, line: usize, column: usize) -> Self {
        Token {
            kind,
            literal,
            line,
            column,
        }
    }

    /// Source text of the token, or the empty string for the stream sentinel
    pub fn text(&self) -> String {
        self.literal
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Integer value of a `Number` token
    pub fn int_value(&self) -> Option<i32> {
        match self.literal {
            Some(Literal::Int(value)) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self
            .literal
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "null".to_string());
        write!(f, "token: {}\tlexical unit: {}", value, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display_matches_dump_format() {
        let token = Token::new(TokenKind::VarName, Some(Literal::Text("abc".into())), 1, 1);
        assert_eq!(token.to_string(), "token: abc\tlexical unit: VARNAME");

        let eos = Token::new(TokenKind::EndOfStream, None, 3, 1);
        assert_eq!(eos.to_string(), "token: null\tlexical unit: END_OF_STREAM");
    }

    #[test]
    fn test_operator_classification() {
        assert!(TokenKind::GreaterEqual.is_comparison());
        assert!(TokenKind::Not.is_operator());
        assert!(!TokenKind::VarName.is_operator());
        assert!(!TokenKind::Beg.is_operator());
    }

    #[test]
    fn test_int_value() {
        let token = Token::new(TokenKind::Number, Some(Literal::Int(42)), 1, 4);
        assert_eq!(token.int_value(), Some(42));
        assert_eq!(token.text(), "42");
    }
}
