//! Precedence rearrangement
//!
//! Rebuilds every flat `ExprArith`/`Cond` chain of the draft AST as a tree
//! of operator nodes. A binary operator node is a terminal labelled with
//! the operator token and holding exactly two children; prefix `-` and
//! `not` hold exactly one.
//!
//! Tiers, loosest first: `or`, `and`, prefix `not`, comparisons, `+ -`,
//! `* /`, prefix `-`. Binary tiers split at their rightmost operator so
//! that the left side absorbs earlier operators of the same tier, which
//! makes every binary tier left-associative.

use tracing::debug;

use crate::token::TokenKind;
use crate::tree::{Label, Tree};
use crate::{CompileError, Result};

/// Rearrange every operator chain of a draft AST
pub fn rearrange(tree: Tree) -> Result<Tree> {
    let tree = simplify(tree)?;
    debug!(nodes = tree.size(), "rearranged AST");
    Ok(tree)
}

fn simplify(tree: Tree) -> Result<Tree> {
    match tree.variable() {
        Some(variable) if variable.is_chain() => reduce(tree.children),
        _ => {
            let children = tree
                .children
                .into_iter()
                .map(simplify)
                .collect::<Result<Vec<_>>>()?;
            Ok(Tree {
                label: tree.label,
                children,
            })
        }
    }
}

fn is_or(kind: TokenKind) -> bool {
    kind == TokenKind::Or
}

fn is_and(kind: TokenKind) -> bool {
    kind == TokenKind::And
}

fn is_comparison(kind: TokenKind) -> bool {
    kind.is_comparison()
}

fn is_additive(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Plus | TokenKind::Minus)
}

fn is_multiplicative(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Times | TokenKind::Divide)
}

/// Reduce a flat operand/operator list to a single subtree
fn reduce(mut items: Vec<Tree>) -> Result<Tree> {
    match items.len() {
        0 => return Err(CompileError::malformed("empty operator chain")),
        1 => return operand(items.remove(0)),
        _ => {}
    }

    for tier in [is_or, is_and] {
        if let Some(split) = rightmost_binary(&items, tier) {
            return binary(items, split);
        }
    }
    if is_prefix(&items, TokenKind::Not) {
        return prefix(items);
    }
    for tier in [is_comparison, is_additive, is_multiplicative] {
        if let Some(split) = rightmost_binary(&items, tier) {
            return binary(items, split);
        }
    }
    if is_prefix(&items, TokenKind::Minus) {
        return prefix(items);
    }

    Err(CompileError::malformed(format!(
        "no operator to split in chain of {} items",
        items.len()
    )))
}

/// A reduced chain element: a leaf operand or a nested chain
fn operand(tree: Tree) -> Result<Tree> {
    if let Some(kind) = tree.token_kind() {
        return match kind {
            TokenKind::VarName | TokenKind::Number => Ok(tree),
            other => Err(CompileError::malformed(format!(
                "operator {} has no operands",
                other
            ))),
        };
    }
    match tree.variable() {
        Some(variable) if variable.is_chain() => reduce(tree.children),
        _ => Err(CompileError::malformed(format!(
            "{} cannot appear inside an expression",
            tree.label
        ))),
    }
}

fn is_operator(tree: &Tree) -> bool {
    tree.children.is_empty() && tree.token_kind().is_some_and(|kind| kind.is_operator())
}

fn is_prefix(items: &[Tree], kind: TokenKind) -> bool {
    items.first().and_then(Tree::token_kind) == Some(kind) && items.len() >= 2
}

/// Rightmost operator of a tier that sits between two operands
///
/// An operator directly after another operator is in prefix position and
/// never splits the chain.
fn rightmost_binary(items: &[Tree], matches_tier: fn(TokenKind) -> bool) -> Option<usize> {
    (1..items.len().saturating_sub(1)).rev().find(|&i| {
        is_operator(&items[i])
            && items[i].token_kind().is_some_and(matches_tier)
            && !is_operator(&items[i - 1])
    })
}

fn binary(mut items: Vec<Tree>, split: usize) -> Result<Tree> {
    let rhs = items.split_off(split + 1);
    let op = items.pop().ok_or_else(|| CompileError::malformed("missing operator"))?;
    let lhs = reduce(items)?;
    let rhs = reduce(rhs)?;
    Ok(operator_node(op.label, vec![lhs, rhs]))
}

fn prefix(mut items: Vec<Tree>) -> Result<Tree> {
    let rest = items.split_off(1);
    let op = items.pop().ok_or_else(|| CompileError::malformed("missing operator"))?;
    let operand = reduce(rest)?;
    Ok(operator_node(op.label, vec![operand]))
}

fn operator_node(label: Label, children: Vec<Tree>) -> Tree {
    Tree { label, children }
}
