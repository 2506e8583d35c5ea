//! Abstract Syntax Tree definitions for ALGOL-0
//!
//! The typed AST is read off the rearranged tree: statements become one
//! variant per form, operator nodes become `Expr::Binary`/`Expr::Unary`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::{Token, TokenKind};
use crate::tree::{Tree, Variable};
use crate::{CompileError, Result};

/// A complete ALGOL-0 program: the statements between `begin` and `end`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub body: Vec<Statement>,
}

/// A statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `x := expr`
    Assign { target: Identifier, value: Expr },
    /// `if cond then ... [else ...] endif`
    If {
        cond: Expr,
        then_body: Vec<Statement>,
        /// `None` when there is no `else` arm or the arm is empty
        else_body: Option<Vec<Statement>>,
        span: Span,
    },
    /// `while cond do ... endwhile`
    While {
        cond: Expr,
        body: Vec<Statement>,
        span: Span,
    },
    /// `for x from a by b to c do ... endwhile`
    For {
        var: Identifier,
        from: Expr,
        by: Expr,
        to: Expr,
        body: Vec<Statement>,
    },
    /// `print(x)`
    Print(Identifier),
    /// `read(x)`
    Read(Identifier),
}

impl Statement {
    /// Where the statement starts
    ///
    /// Keywords are filtered out before the AST is built, so for `if` and
    /// `while` this is the start of the condition.
    pub fn span(&self) -> Span {
        match self {
            Statement::Assign { target, .. } => target.span,
            Statement::If { span, .. } | Statement::While { span, .. } => *span,
            Statement::For { var, .. } => var.span,
            Statement::Print(var) | Statement::Read(var) => var.span,
        }
    }

    /// Construct name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Assign { .. } => "assignment",
            Statement::If { .. } => "if",
            Statement::While { .. } => "while",
            Statement::For { .. } => "for",
            Statement::Print(_) => "print",
            Statement::Read(_) => "read",
        }
    }
}

/// An arithmetic expression or a condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Binary operation: a + b, x = y, c and d
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation: -n, not c
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Variable reference
    Var(Identifier),
    /// Integer literal
    IntLit(i32),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Times => BinaryOp::Mul,
            TokenKind::Divide => BinaryOp::Div,
            TokenKind::Equal => BinaryOp::Eq,
            TokenKind::Different => BinaryOp::Ne,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEqual => BinaryOp::Ge,
            TokenKind::Smaller => BinaryOp::Lt,
            TokenKind::SmallerEqual => BinaryOp::Le,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Surface spelling
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "/=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

/// A variable name with its position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Source location (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<&Token> for Span {
    fn from(token: &Token) -> Self {
        Span::new(token.line, token.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// ----------------------------------------------------------------------------
// Conversion from the rearranged tree
// ----------------------------------------------------------------------------

impl TryFrom<&Tree> for Program {
    type Error = CompileError;

    fn try_from(tree: &Tree) -> Result<Self> {
        if !tree.is(Variable::Program) {
            return Err(CompileError::malformed(format!(
                "expected <Program>, found {}",
                tree.label
            )));
        }
        let code = tree
            .children
            .iter()
            .find(|child| child.is(Variable::Code))
            .ok_or_else(|| CompileError::malformed("<Program> has no <Code>"))?;

        Ok(Program {
            body: statements(code)?,
        })
    }
}

fn statements(code: &Tree) -> Result<Vec<Statement>> {
    if !code.is(Variable::Code) {
        return Err(CompileError::malformed(format!(
            "expected <Code>, found {}",
            code.label
        )));
    }
    code.children.iter().map(statement).collect()
}

fn child(tree: &Tree, index: usize) -> Result<&Tree> {
    tree.children.get(index).ok_or_else(|| {
        CompileError::malformed(format!(
            "{} has {} children, needed at least {}",
            tree.label,
            tree.children.len(),
            index + 1
        ))
    })
}

fn expect_arity(tree: &Tree, arity: usize) -> Result<()> {
    if tree.children.len() == arity {
        Ok(())
    } else {
        Err(CompileError::malformed(format!(
            "{} has {} children, expected {}",
            tree.label,
            tree.children.len(),
            arity
        )))
    }
}

fn span_of(tree: &Tree) -> Span {
    tree.first_token().map(Span::from).unwrap_or_default()
}

fn statement(tree: &Tree) -> Result<Statement> {
    let variable = tree.variable().ok_or_else(|| {
        CompileError::malformed(format!("stray terminal {} in statement list", tree.label))
    })?;

    match variable {
        Variable::Assign => {
            expect_arity(tree, 2)?;
            Ok(Statement::Assign {
                target: identifier(child(tree, 0)?)?,
                value: expr(child(tree, 1)?)?,
            })
        }
        Variable::If => {
            let else_body = match tree.children.len() {
                2 => None,
                3 => Some(statements(child(tree, 2)?)?).filter(|body| !body.is_empty()),
                _ => {
                    return Err(CompileError::malformed(format!(
                        "<If> has {} children",
                        tree.children.len()
                    )))
                }
            };
            Ok(Statement::If {
                cond: expr(child(tree, 0)?)?,
                then_body: statements(child(tree, 1)?)?,
                else_body,
                span: span_of(tree),
            })
        }
        Variable::While => {
            expect_arity(tree, 2)?;
            Ok(Statement::While {
                cond: expr(child(tree, 0)?)?,
                body: statements(child(tree, 1)?)?,
                span: span_of(tree),
            })
        }
        Variable::For => {
            expect_arity(tree, 5)?;
            Ok(Statement::For {
                var: identifier(child(tree, 0)?)?,
                from: expr(child(tree, 1)?)?,
                by: expr(child(tree, 2)?)?,
                to: expr(child(tree, 3)?)?,
                body: statements(child(tree, 4)?)?,
            })
        }
        Variable::Print => {
            expect_arity(tree, 1)?;
            Ok(Statement::Print(identifier(child(tree, 0)?)?))
        }
        Variable::Read => {
            expect_arity(tree, 1)?;
            Ok(Statement::Read(identifier(child(tree, 0)?)?))
        }
        other => Err(CompileError::malformed(format!(
            "{} is not a statement",
            other
        ))),
    }
}

fn identifier(tree: &Tree) -> Result<Identifier> {
    match tree.token() {
        Some(token) if token.kind == TokenKind::VarName => {
            Ok(Identifier::new(token.text(), Span::from(token)))
        }
        _ => Err(CompileError::malformed(format!(
            "expected a variable name, found {}",
            tree.label
        ))),
    }
}

fn expr(tree: &Tree) -> Result<Expr> {
    let token = tree.token().ok_or_else(|| {
        CompileError::malformed(format!("unreduced {} in expression", tree.label))
    })?;

    match (token.kind, tree.children.len()) {
        (TokenKind::VarName, 0) => identifier(tree).map(Expr::Var),
        (TokenKind::Number, 0) => token
            .int_value()
            .map(Expr::IntLit)
            .ok_or_else(|| CompileError::malformed("number token without a value")),
        (TokenKind::Minus, 1) => unary(UnaryOp::Neg, tree),
        (TokenKind::Not, 1) => unary(UnaryOp::Not, tree),
        (kind, 2) => {
            let op = BinaryOp::from_token(kind).ok_or_else(|| {
                CompileError::malformed(format!("{} is not a binary operator", kind))
            })?;
            Ok(Expr::Binary {
                left: Box::new(expr(child(tree, 0)?)?),
                op,
                right: Box::new(expr(child(tree, 1)?)?),
            })
        }
        (kind, arity) => Err(CompileError::malformed(format!(
            "{} node with {} children",
            kind, arity
        ))),
    }
}

fn unary(op: UnaryOp, tree: &Tree) -> Result<Expr> {
    Ok(Expr::Unary {
        op,
        operand: Box::new(expr(child(tree, 0)?)?),
    })
}
