//! ALGOL-0 Linter
//!
//! Advisory checks over the final AST. Warnings never stop compilation.
//!
//! The walk follows the code generator's visitation order, including
//! skipping constructs it elides, so "before" below means "earlier in the
//! emitted IR".

use std::collections::HashSet;

use tracing::warn;

use crate::ast::*;

/// Lint warning severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A lint warning
#[derive(Debug, Clone)]
pub struct LintWarning {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for LintWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        write!(f, ": [{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  help: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Lint an ALGOL-0 program and return warnings
pub fn lint(program: &Program) -> Vec<LintWarning> {
    let mut linter = Linter::default();
    linter.block(&program.body);

    for warning in &linter.warnings {
        warn!(code = warning.code, line = warning.line, "{}", warning.message);
    }
    linter.warnings
}

#[derive(Default)]
struct Linter {
    /// Variables holding a value at this point of the walk
    stored: HashSet<String>,
    /// Variables already reported by W001
    reported: HashSet<String>,
    warnings: Vec<LintWarning>,
}

impl Linter {
    fn block(&mut self, body: &[Statement]) {
        for statement in body {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        let line = statement.span().line;

        match statement {
            Statement::Assign { target, value } => {
                self.expr(value, line);
                self.store(target);
            }
            Statement::Read(var) => self.store(var),
            Statement::Print(var) => self.use_var(var),
            Statement::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                if then_body.is_empty() && else_body.is_none() {
                    self.elided(statement);
                    return;
                }
                self.expr(cond, line);
                self.block(then_body);
                if let Some(else_body) = else_body {
                    self.block(else_body);
                }
            }
            Statement::While { cond, body, .. } => {
                if body.is_empty() {
                    self.elided(statement);
                    return;
                }
                self.expr(cond, line);
                self.block(body);
            }
            Statement::For {
                var,
                from,
                by,
                to,
                body,
            } => {
                if body.is_empty() {
                    self.elided(statement);
                    return;
                }
                self.expr(from, line);
                self.store(var);
                self.expr(to, line);
                self.block(body);
                self.expr(by, line);
            }
        }
    }

    fn expr(&mut self, expr: &Expr, line: usize) {
        match expr {
            Expr::Var(var) => self.use_var(var),
            Expr::IntLit(_) => {}
            Expr::Unary { operand, .. } => self.expr(operand, line),
            Expr::Binary { left, op, right } => {
                self.expr(left, line);
                self.expr(right, line);
                if *op == BinaryOp::Div && **right == Expr::IntLit(0) {
                    self.warnings.push(LintWarning {
                        severity: Severity::Warning,
                        code: "W003",
                        message: "division by the literal 0".to_string(),
                        line: Some(line),
                        suggestion: None,
                    });
                }
            }
        }
    }

    fn store(&mut self, var: &Identifier) {
        self.stored.insert(var.name.clone());
    }

    fn use_var(&mut self, var: &Identifier) {
        if self.stored.contains(&var.name) || !self.reported.insert(var.name.clone()) {
            return;
        }
        self.warnings.push(LintWarning {
            severity: Severity::Warning,
            code: "W001",
            message: format!("variable '{}' is loaded before any value is stored in it", var.name),
            line: Some(var.span.line),
            suggestion: Some(format!("assign '{}' or read it before this point", var.name)),
        });
    }

    fn elided(&mut self, statement: &Statement) {
        self.warnings.push(LintWarning {
            severity: Severity::Info,
            code: "W002",
            message: format!(
                "{} has an empty body and generates no code",
                statement.kind_name()
            ),
            line: Some(statement.span().line),
            suggestion: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_ast;

    fn codes(source: &str) -> Vec<&'static str> {
        lint(&build_ast(source).unwrap())
            .iter()
            .map(|w| w.code)
            .collect()
    }

    #[test]
    fn test_clean_program() {
        assert!(codes("begin read(n); while n > 0 do print(n); n := n - 1 endwhile end").is_empty());
    }

    #[test]
    fn test_lint_use_before_store() {
        let warnings = lint(&build_ast("begin\nprint(x);\ny := x + 1\nend").unwrap());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "W001");
        assert_eq!(warnings[0].line, Some(2));
        assert!(warnings[0].message.contains("'x'"));
    }

    #[test]
    fn test_lint_self_assignment_reads_undefined_value() {
        let warnings = lint(&build_ast("begin x := x + 1 end").unwrap());
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].message,
            "variable 'x' is loaded before any value is stored in it"
        );
        assert!(codes("begin x := 0; x := x + 1 end").is_empty());
    }

    #[test]
    fn test_lint_for_variable_is_stored() {
        assert!(codes("begin for i from 0 by 1 to 3 do print(i) endwhile end").is_empty());
    }

    #[test]
    fn test_lint_elided_constructs() {
        let warnings = lint(
            &build_ast("begin for i from 0 by 1 to 3 do endwhile; print(i) end").unwrap(),
        );
        let codes: Vec<_> = warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, vec!["W002", "W001"]);
        assert!(warnings[0].message.starts_with("for "));
        assert_eq!(warnings[0].severity, Severity::Info);
    }

    #[test]
    fn test_elided_while_reported_at_condition_start() {
        let warnings = lint(&build_ast("begin\nwhile a\n  > 1 do endwhile\nend").unwrap());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "W002");
        assert_eq!(warnings[0].line, Some(2));
    }

    #[test]
    fn test_lint_division_by_zero() {
        assert_eq!(codes("begin a := 1; b := a / 0 end"), vec!["W003"]);
        assert!(codes("begin a := 1; b := a / (0 + 1) end").is_empty());
    }

    #[test]
    fn test_warning_display() {
        let warning = LintWarning {
            severity: Severity::Warning,
            code: "W003",
            message: "division by the literal 0".to_string(),
            line: Some(4),
            suggestion: Some("check the divisor".to_string()),
        };
        assert_eq!(
            warning.to_string(),
            "warning at line 4: [W003] division by the literal 0\n  help: check the divisor"
        );
    }
}
