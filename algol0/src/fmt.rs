//! ALGOL-0 Source Code Formatter
//!
//! Renders a final AST back to surface syntax. Every arithmetic operation
//! is parenthesized, so the output shows exactly how precedence was
//! resolved. Conditions cannot be parenthesized in the language and are
//! printed flat; their operator nodes are always left-nested, so the flat
//! form parses back to the same tree.

use crate::ast::*;

const INDENT: &str = "  ";

/// Format an ALGOL-0 program as a string
pub fn format_program(program: &Program) -> String {
    let mut output = String::from("begin\n");
    format_block(&program.body, 1, &mut output);
    output.push_str("end\n");
    output
}

fn format_block(body: &[Statement], depth: usize, output: &mut String) {
    for (i, statement) in body.iter().enumerate() {
        format_statement(statement, depth, output);
        if i + 1 < body.len() {
            output.push(';');
        }
        output.push('\n');
    }
}

fn format_statement(statement: &Statement, depth: usize, output: &mut String) {
    let pad = INDENT.repeat(depth);
    output.push_str(&pad);

    match statement {
        Statement::Assign { target, value } => {
            output.push_str(&format!("{} := {}", target.name, format_expr(value)));
        }
        Statement::Print(var) => output.push_str(&format!("print({})", var.name)),
        Statement::Read(var) => output.push_str(&format!("read({})", var.name)),
        Statement::If {
            cond,
            then_body,
            else_body,
            ..
        } => {
            output.push_str(&format!("if {} then\n", format_expr(cond)));
            format_block(then_body, depth + 1, output);
            if let Some(else_body) = else_body {
                output.push_str(&format!("{}else\n", pad));
                format_block(else_body, depth + 1, output);
            }
            output.push_str(&format!("{}endif", pad));
        }
        Statement::While { cond, body, .. } => {
            output.push_str(&format!("while {} do\n", format_expr(cond)));
            format_block(body, depth + 1, output);
            output.push_str(&format!("{}endwhile", pad));
        }
        Statement::For {
            var,
            from,
            by,
            to,
            body,
        } => {
            output.push_str(&format!(
                "for {} from {} by {} to {} do\n",
                var.name,
                format_expr(from),
                format_expr(by),
                format_expr(to)
            ));
            format_block(body, depth + 1, output);
            output.push_str(&format!("{}endwhile", pad));
        }
    }
}

/// Format an expression
pub fn format_expr(expr: &Expr) -> String {
    match expr {
        Expr::Var(id) => id.name.clone(),
        Expr::IntLit(n) => n.to_string(),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => format!("-{}", format_expr(operand)),
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => format!("not {}", format_expr(operand)),
        Expr::Binary { left, op, right } if op.is_comparison() || op.is_logical() => {
            format!("{} {} {}", format_expr(left), op, format_expr(right))
        }
        Expr::Binary { left, op, right } => {
            format!("({} {} {})", format_expr(left), op, format_expr(right))
        }
    }
}
