//! ALGOL-0 Parser
//!
//! Parses ALGOL-0 source code into a derivation tree using the pest PEG
//! parser. The grammar mirrors the numbered LL(1) productions one rule per
//! nonterminal, so the resulting tree keeps every helper nonterminal,
//! epsilon expansions included.

use pest::error::{InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::debug;

use crate::token::{Literal, Token, TokenKind};
use crate::tree::{ParseTree, Tree, Variable};
use crate::{CompileError, Result};

#[derive(Parser)]
#[grammar = "../grammar/algol0.pest"]
pub(crate) struct AlgolParser;

/// Parse ALGOL-0 source code into a derivation tree
///
/// Stops at the first syntax error; there is no recovery.
pub fn parse(source: &str) -> Result<ParseTree> {
    let mut pairs = AlgolParser::parse(Rule::file, source).map_err(syntax_error)?;

    let program = pairs
        .next()
        .ok_or_else(|| CompileError::malformed("parser produced no program"))?;
    let tree = build_tree(program)?;

    debug!(nodes = tree.size(), "parsed derivation tree");
    Ok(tree)
}

fn build_tree(pair: Pair<Rule>) -> Result<Tree> {
    let rule = pair.as_rule();

    if let Some(kind) = token_kind(rule) {
        return Ok(Tree::leaf(token_from_pair(kind, &pair)?));
    }

    let variable = variable(rule)
        .ok_or_else(|| CompileError::malformed(format!("unexpected rule {:?}", rule)))?;
    let children = pair
        .into_inner()
        .map(build_tree)
        .collect::<Result<Vec<_>>>()?;

    Ok(Tree::node(variable, children))
}

/// Convert a terminal pair into a token, checking integer literal range
pub(crate) fn token_from_pair(kind: TokenKind, pair: &Pair<Rule>) -> Result<Token> {
    let (line, column) = pair.as_span().start_pos().line_col();
    let text = pair.as_str();

    let literal = match kind {
        TokenKind::Number => {
            let value = text.parse::<i32>().map_err(|_| CompileError::Lexical {
                line,
                column,
                message: format!("integer literal `{}` does not fit in 32 bits", text),
            })?;
            Literal::Int(value)
        }
        _ => Literal::Text(text.to_string()),
    };

    Ok(Token::new(kind, Some(literal), line, column))
}

/// Token category of a terminal rule
pub(crate) fn token_kind(rule: Rule) -> Option<TokenKind> {
    let kind = match rule {
        Rule::varname => TokenKind::VarName,
        Rule::number => TokenKind::Number,
        Rule::kw_begin => TokenKind::Beg,
        Rule::kw_end => TokenKind::End,
        Rule::semicolon => TokenKind::Semicolon,
        Rule::assign_op => TokenKind::Assign,
        Rule::lparen => TokenKind::LeftParenthesis,
        Rule::rparen => TokenKind::RightParenthesis,
        Rule::minus => TokenKind::Minus,
        Rule::plus => TokenKind::Plus,
        Rule::times => TokenKind::Times,
        Rule::divide => TokenKind::Divide,
        Rule::kw_if => TokenKind::If,
        Rule::kw_then => TokenKind::Then,
        Rule::kw_endif => TokenKind::EndIf,
        Rule::kw_else => TokenKind::Else,
        Rule::kw_not => TokenKind::Not,
        Rule::kw_and => TokenKind::And,
        Rule::kw_or => TokenKind::Or,
        Rule::equal => TokenKind::Equal,
        Rule::greater_equal => TokenKind::GreaterEqual,
        Rule::greater => TokenKind::Greater,
        Rule::smaller_equal => TokenKind::SmallerEqual,
        Rule::smaller => TokenKind::Smaller,
        Rule::different => TokenKind::Different,
        Rule::kw_while => TokenKind::While,
        Rule::kw_do => TokenKind::Do,
        Rule::kw_endwhile => TokenKind::EndWhile,
        Rule::kw_for => TokenKind::For,
        Rule::kw_from => TokenKind::From,
        Rule::kw_by => TokenKind::By,
        Rule::kw_to => TokenKind::To,
        Rule::kw_print => TokenKind::Print,
        Rule::kw_read => TokenKind::Read,
        Rule::EOI => TokenKind::EndOfStream,
        _ => return None,
    };
    Some(kind)
}

fn variable(rule: Rule) -> Option<Variable> {
    let variable = match rule {
        Rule::program => Variable::Program,
        Rule::code => Variable::Code,
        Rule::inst_list => Variable::InstList,
        Rule::next_inst => Variable::NextInst,
        Rule::instruction => Variable::Instruction,
        Rule::assign => Variable::Assign,
        Rule::expr_arith => Variable::ExprArith,
        Rule::expr_arith_prime => Variable::ExprArithPrime,
        Rule::prod => Variable::Prod,
        Rule::prod_prime => Variable::ProdPrime,
        Rule::atom => Variable::Atom,
        Rule::if_stmt => Variable::If,
        Rule::if_seq => Variable::IfSeq,
        Rule::cond => Variable::Cond,
        Rule::cond_prime => Variable::CondPrime,
        Rule::cond_and => Variable::CondAnd,
        Rule::cond_and_prime => Variable::CondAndPrime,
        Rule::simple_cond => Variable::SimpleCond,
        Rule::comp => Variable::Comp,
        Rule::while_stmt => Variable::While,
        Rule::for_stmt => Variable::For,
        Rule::print_stmt => Variable::Print,
        Rule::read_stmt => Variable::Read,
        _ => return None,
    };
    Some(variable)
}

/// Human-readable name of a rule for "expected ..." messages
fn describe_rule(rule: &Rule) -> String {
    if let Some(kind) = token_kind(*rule) {
        return kind.describe().to_string();
    }
    if let Some(variable) = variable(*rule) {
        return variable.to_string();
    }
    format!("{:?}", rule)
}

/// Line and column of a pest error
pub(crate) fn error_position(location: &LineColLocation) -> (usize, usize) {
    match location {
        LineColLocation::Pos((l, c)) => (*l, *c),
        LineColLocation::Span((l, c), _) => (*l, *c),
    }
}

/// Byte offset of a pest error
pub(crate) fn error_offset(location: &InputLocation) -> usize {
    match location {
        InputLocation::Pos(offset) => *offset,
        InputLocation::Span((offset, _)) => *offset,
    }
}

fn syntax_error(e: pest::error::Error<Rule>) -> CompileError {
    let e = e.renamed_rules(describe_rule);
    let (line, column) = error_position(&e.line_col);
    CompileError::Syntax {
        line,
        column,
        message: e.variant.message().to_string(),
    }
}
