//! Labelled n-ary trees
//!
//! One node shape serves the derivation tree, the draft AST and the
//! rearranged AST: a label (grammar variable or terminal token) and an
//! ordered list of owned children.

use std::fmt;

use crate::token::{Token, TokenKind};

/// Grammar variables (nonterminals)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    Program,
    Code,
    InstList,
    NextInst,
    Instruction,
    Assign,
    ExprArith,
    ExprArithPrime,
    Prod,
    ProdPrime,
    Atom,
    If,
    IfSeq,
    Cond,
    CondPrime,
    CondAnd,
    CondAndPrime,
    SimpleCond,
    Comp,
    While,
    For,
    Print,
    Read,
}

impl Variable {
    pub fn name(&self) -> &'static str {
        match self {
            Variable::Program => "<Program>",
            Variable::Code => "<Code>",
            Variable::InstList => "<InstList>",
            Variable::NextInst => "<NextInst>",
            Variable::Instruction => "<Instruction>",
            Variable::Assign => "<Assign>",
            Variable::ExprArith => "<ExprArith>",
            Variable::ExprArithPrime => "<ExprArith'>",
            Variable::Prod => "<Prod>",
            Variable::ProdPrime => "<Prod'>",
            Variable::Atom => "<Atom>",
            Variable::If => "<If>",
            Variable::IfSeq => "<IfSeq>",
            Variable::Cond => "<Cond>",
            Variable::CondPrime => "<Cond'>",
            Variable::CondAnd => "<CondAnd>",
            Variable::CondAndPrime => "<CondAnd'>",
            Variable::SimpleCond => "<SimpleCond>",
            Variable::Comp => "<Comp>",
            Variable::While => "<While>",
            Variable::For => "<For>",
            Variable::Print => "<Print>",
            Variable::Read => "<Read>",
        }
    }

    /// Arithmetic and boolean chains that get rearranged into binary trees
    pub fn is_chain(&self) -> bool {
        matches!(self, Variable::ExprArith | Variable::Cond)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node label: a grammar variable or a terminal token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    NonTerminal(Variable),
    Terminal(Token),
}

impl Label {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Label::Terminal(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::NonTerminal(variable) => write!(f, "{}", variable),
            Label::Terminal(token) => f.write_str(&token.text()),
        }
    }
}

/// A tree node owning its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub label: Label,
    pub children: Vec<Tree>,
}

/// The parser's grammar-shaped tree
pub type ParseTree = Tree;

impl Tree {
    pub fn node(variable: Variable, children: Vec<Tree>) -> Self {
        Tree {
            label: Label::NonTerminal(variable),
            children,
        }
    }

    pub fn leaf(token: Token) -> Self {
        Tree {
            label: Label::Terminal(token),
            children: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.label.is_terminal()
    }

    pub fn variable(&self) -> Option<Variable> {
        match &self.label {
            Label::NonTerminal(variable) => Some(*variable),
            Label::Terminal(_) => None,
        }
    }

    pub fn token(&self) -> Option<&Token> {
        match &self.label {
            Label::Terminal(token) => Some(token),
            Label::NonTerminal(_) => None,
        }
    }

    pub fn token_kind(&self) -> Option<TokenKind> {
        self.token().map(|token| token.kind)
    }

    pub fn is(&self, variable: Variable) -> bool {
        self.variable() == Some(variable)
    }

    /// Leftmost terminal in source order
    ///
    /// A rearranged binary operator sits above its left operand, so the
    /// search continues into that operand. Prefix operators are their own
    /// leftmost token.
    pub fn first_token(&self) -> Option<&Token> {
        match &self.label {
            Label::Terminal(_) if self.children.len() == 2 => self.children[0].first_token(),
            Label::Terminal(token) => Some(token),
            Label::NonTerminal(_) => self.children.iter().find_map(Tree::first_token),
        }
    }

    /// Total node count, used in debug logging
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Tree::size).sum::<usize>()
    }

    /// Indented outline, one node per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.label.to_string());
        out.push('\n');
        for child in &self.children {
            child.write_outline(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Literal;

    fn var(name: &str) -> Tree {
        Tree::leaf(Token::new(TokenKind::VarName, Some(Literal::Text(name.into())), 1, 1))
    }

    #[test]
    fn test_first_token_and_size() {
        let tree = Tree::node(
            Variable::Assign,
            vec![Tree::node(Variable::ExprArith, vec![var("a")]), var("b")],
        );
        assert_eq!(tree.size(), 4);
        assert_eq!(tree.first_token().map(Token::text), Some("a".to_string()));
    }

    #[test]
    fn test_first_token_of_operator_node() {
        // `a >= b` with `a` on line 1, after rearrangement
        let a = Tree::leaf(Token::new(TokenKind::VarName, Some(Literal::Text("a".into())), 1, 9));
        let mut ge = Tree::leaf(Token::new(TokenKind::GreaterEqual, None, 2, 3));
        ge.children = vec![a, var("b")];
        let first = ge.first_token().unwrap();
        assert_eq!((first.line, first.column), (1, 9));

        let mut not = Tree::leaf(Token::new(TokenKind::Not, None, 1, 4));
        not.children = vec![var("c")];
        assert_eq!(not.first_token().map(|t| t.kind), Some(TokenKind::Not));
    }

    #[test]
    fn test_outline() {
        let tree = Tree::node(Variable::Print, vec![var("x")]);
        assert_eq!(tree.outline(), "<Print>\n  x\n");
    }
}
