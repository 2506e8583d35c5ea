//! Draft AST construction
//!
//! Filters the derivation tree down to the nodes that carry meaning.
//! Helper nonterminals are spliced into their nearest kept ancestor and
//! punctuation is dropped, so operator chains come out as flat
//! operand/operator/operand lists under an `ExprArith` or `Cond` node.

use tracing::debug;

use crate::token::TokenKind;
use crate::tree::{Label, ParseTree, Tree, Variable};
use crate::{CompileError, Result};

/// Filter a derivation tree into a draft AST
pub fn build(tree: &ParseTree) -> Result<Tree> {
    if !tree.is(Variable::Program) {
        return Err(CompileError::malformed(format!(
            "derivation tree is rooted at {}, not <Program>",
            tree.label
        )));
    }

    let draft = Tree::node(Variable::Program, filter_children(tree));
    debug!(nodes = draft.size(), "built draft AST");
    Ok(draft)
}

fn filter_children(tree: &ParseTree) -> Vec<Tree> {
    let mut kept = Vec::new();
    for child in &tree.children {
        filter_into(child, &mut kept);
    }
    kept
}

fn filter_into(tree: &ParseTree, out: &mut Vec<Tree>) {
    match &tree.label {
        Label::NonTerminal(variable) if is_kept_variable(*variable) => {
            out.push(Tree::node(*variable, filter_children(tree)));
        }
        Label::NonTerminal(_) => {
            for child in &tree.children {
                filter_into(child, out);
            }
        }
        Label::Terminal(token) if is_kept_terminal(token.kind) => {
            out.push(Tree::leaf(token.clone()));
        }
        Label::Terminal(_) => {}
    }
}

fn is_kept_variable(variable: Variable) -> bool {
    matches!(
        variable,
        Variable::Program
            | Variable::Code
            | Variable::Assign
            | Variable::If
            | Variable::While
            | Variable::For
            | Variable::Print
            | Variable::Read
            | Variable::ExprArith
            | Variable::Cond
    )
}

fn is_kept_terminal(kind: TokenKind) -> bool {
    kind.is_operator() || matches!(kind, TokenKind::VarName | TokenKind::Number | TokenKind::Beg | TokenKind::End)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn draft(source: &str) -> Tree {
        build(&parse(source).unwrap()).unwrap()
    }

    fn labels(tree: &Tree) -> Vec<String> {
        tree.children.iter().map(|c| c.label.to_string()).collect()
    }

    #[test]
    fn test_program_frame() {
        let tree = draft("begin end");
        assert_eq!(labels(&tree), vec!["begin", "<Code>", "end"]);
        assert!(tree.children[1].children.is_empty());
    }

    #[test]
    fn test_statements_are_spliced_into_code() {
        let tree = draft("begin read(a); print(a); b := a end");
        let code = &tree.children[1];
        assert_eq!(labels(code), vec!["<Read>", "<Print>", "<Assign>"]);
        assert_eq!(labels(&code.children[0]), vec!["a"]);
    }

    #[test]
    fn test_expression_chain_is_flat() {
        let tree = draft("begin x := a + b * -c end");
        let assign = &tree.children[1].children[0];
        assert_eq!(labels(assign), vec!["x", "<ExprArith>"]);
        assert_eq!(labels(&assign.children[1]), vec!["a", "+", "b", "*", "-", "c"]);
    }

    #[test]
    fn test_parenthesized_expression_stays_nested() {
        let tree = draft("begin x := (a + b) * c end");
        let expr = &tree.children[1].children[0].children[1];
        assert_eq!(labels(expr), vec!["<ExprArith>", "*", "c"]);
        assert_eq!(labels(&expr.children[0]), vec!["a", "+", "b"]);
    }

    #[test]
    fn test_condition_chain_and_control_shapes() {
        let tree = draft("begin if a = 1 or not b > 2 then print(a) else endif end");
        let if_node = &tree.children[1].children[0];
        assert_eq!(labels(if_node), vec!["<Cond>", "<Code>", "<Code>"]);

        let cond = &if_node.children[0];
        assert_eq!(
            labels(cond),
            vec!["<ExprArith>", "=", "<ExprArith>", "or", "not", "<ExprArith>", ">", "<ExprArith>"]
        );
        assert!(if_node.children[2].children.is_empty());
    }

    #[test]
    fn test_for_shape() {
        let tree = draft("begin for i from 0 by 1 to n do print(i) endwhile end");
        let for_node = &tree.children[1].children[0];
        assert_eq!(
            labels(for_node),
            vec!["i", "<ExprArith>", "<ExprArith>", "<ExprArith>", "<Code>"]
        );
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let parse_tree = parse("begin while n > 0 do n := n - 1 endwhile end").unwrap();
        assert_eq!(build(&parse_tree).unwrap(), build(&parse_tree).unwrap());
    }

    #[test]
    fn test_rejects_non_program_root() {
        let tree = Tree::node(Variable::Code, Vec::new());
        let err = build(&tree).unwrap_err();
        assert!(err.is_internal());
    }
}
