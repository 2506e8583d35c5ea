//! # ALGOL-0
//!
//! A compiler for a small imperative teaching language (assignment,
//! `if`/`else`, `while`, `for`, `print`, `read`, integer arithmetic and
//! boolean conditions) that emits textual LLVM IR.
//!
//! ## Pipeline
//!
//! ```text
//! source → tokens → derivation tree → draft AST → rearranged AST → Program → IR
//!          lexer     parser           builder     rearrange        ast       codegen
//! ```
//!
//! The parser keeps the grammar's left-recursion-free shape, so operator
//! chains arrive as flat sibling lists. [`builder`] drops the helper
//! nonterminals and [`rearrange`] rebuilds each chain as a binary tree that
//! honours precedence and associativity. [`codegen`] then lowers the typed
//! [`ast::Program`] in a single pass.

pub mod ast;
pub mod builder;
pub mod codegen;
pub mod error;
pub mod fmt;
pub mod grammar;
pub mod ir;
pub mod lexer;
pub mod lint;
pub mod parser;
pub mod rearrange;
pub mod tex;
pub mod token;
pub mod tree;

use thiserror::Error;

/// ALGOL-0 compilation error types
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("lexical error at {line}:{column}: {message}")]
    Lexical {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A tree handed to a later stage does not have the shape the grammar
    /// guarantees. This is a compiler defect, never a user error.
    #[error("internal compiler error: malformed tree: {message}")]
    MalformedTree { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CompileError::MalformedTree {
            message: message.into(),
        }
    }

    /// True for the defect class: the compiler itself is wrong
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::MalformedTree { .. })
    }
}

/// Result type for ALGOL-0 operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Parse, filter and rearrange a source program into its final AST
pub fn build_ast(source: &str) -> Result<ast::Program> {
    let parse_tree = parser::parse(source)?;
    let draft = builder::build(&parse_tree)?;
    let rearranged = rearrange::rearrange(draft)?;
    ast::Program::try_from(&rearranged)
}

/// Compile ALGOL-0 source code to LLVM IR text
pub fn compile_source(source: &str) -> Result<String> {
    let program = build_ast(source)?;
    codegen::generate(&program)
}
