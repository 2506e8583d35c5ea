//! ALGOL-0 Diagnostics
//!
//! Renderable diagnostics with error codes and source context, built from
//! [`CompileError`]s and lint warnings. Rendered either for humans (with a
//! caret under the offending column) or as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Span;
use crate::lint::{LintWarning, Severity};
use crate::CompileError;

/// Diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Front-end errors (E001-E099)
    E001, // Lexical error
    E002, // Syntax error

    // Compiler defects and environment (E900-E999)
    E900, // Internal compiler error
    E901, // I/O error

    // Lints (W001-W099)
    W001, // Use before storage
    W002, // Construct elided
    W003, // Division by literal zero
}

impl ErrorCode {
    /// The code string (e.g., "E001")
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E900 => "E900",
            ErrorCode::E901 => "E901",
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
            ErrorCode::W003 => "W003",
        }
    }

    /// Brief description of the category
    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "lexical error",
            ErrorCode::E002 => "syntax error",
            ErrorCode::E900 => "internal compiler error",
            ErrorCode::E901 => "I/O error",
            ErrorCode::W001 | ErrorCode::W002 | ErrorCode::W003 => "lint",
        }
    }

    fn from_lint(code: &str) -> Option<Self> {
        match code {
            "W001" => Some(ErrorCode::W001),
            "W002" => Some(ErrorCode::W002),
            "W003" => Some(ErrorCode::W003),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Info => write!(f, "info"),
        }
    }
}

/// Error or warning with full context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Code for categorization
    pub code: ErrorCode,
    pub severity: DiagnosticSeverity,
    /// Primary message
    pub message: String,
    /// Source location (if available)
    pub span: Option<Span>,
    /// Suggestion for fixing the problem (if available)
    pub suggestion: Option<String>,
    /// Additional notes
    pub notes: Vec<String>,
    /// Source file path
    pub file: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            span: None,
            suggestion: None,
            notes: Vec::new(),
            file: None,
        }
    }

    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Add source span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add a suggestion for fixing the problem
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Set file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Format with source context
    pub fn format_with_source(&self, source: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}[{}]: {}\n", self.severity, self.code, self.message));

        if let Some(span) = &self.span {
            if let Some(file) = &self.file {
                output.push_str(&format!("  --> {}:{}:{}\n", file, span.line, span.column));
            }

            let lines: Vec<&str> = source.lines().collect();
            if span.line > 0 && span.line <= lines.len() {
                let line_content = lines[span.line - 1];
                let width = span.line.to_string().len();

                output.push_str(&format!("{:>width$} |\n", "", width = width));
                output.push_str(&format!(
                    "{:>width$} | {}\n",
                    span.line,
                    line_content,
                    width = width
                ));
                output.push_str(&format!(
                    "{:>width$} | {:>start$}^\n",
                    "",
                    "",
                    width = width,
                    start = span.column.saturating_sub(1),
                ));
            }
        }

        if let Some(suggestion) = &self.suggestion {
            output.push_str(&format!("  = help: {}\n", suggestion));
        }
        for note in &self.notes {
            output.push_str(&format!("  = note: {}\n", note));
        }

        output
    }

    /// Convert to a single-line JSON string, with the code's category
    pub fn to_json(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(_) => return "{}".to_string(),
        };
        if let Some(object) = value.as_object_mut() {
            object.insert("category".to_string(), self.code.category().into());
        }
        value.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code)?;
        if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (help: {})", suggestion)?;
        }
        Ok(())
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(error: &CompileError) -> Self {
        match error {
            CompileError::Lexical {
                line,
                column,
                message,
            } => Diagnostic::new(ErrorCode::E001, message.clone())
                .with_span(Span::new(*line, *column)),
            CompileError::Syntax {
                line,
                column,
                message,
            } => Diagnostic::new(ErrorCode::E002, message.clone())
                .with_span(Span::new(*line, *column)),
            CompileError::MalformedTree { message } => {
                Diagnostic::new(ErrorCode::E900, format!("malformed tree: {}", message))
                    .with_note("this is a bug in the compiler, not in the program")
            }
            CompileError::Io(e) => Diagnostic::new(ErrorCode::E901, e.to_string()),
        }
    }
}

impl From<&LintWarning> for Diagnostic {
    fn from(warning: &LintWarning) -> Self {
        let severity = match warning.severity {
            Severity::Warning => DiagnosticSeverity::Warning,
            Severity::Info => DiagnosticSeverity::Info,
        };
        let code = ErrorCode::from_lint(warning.code).unwrap_or(ErrorCode::W001);
        let mut diag = Diagnostic::new(code, warning.message.clone()).with_severity(severity);
        if let Some(line) = warning.line {
            diag = diag.with_span(Span::new(line, 1));
        }
        if let Some(suggestion) = &warning.suggestion {
            diag = diag.with_suggestion(suggestion.clone());
        }
        diag
    }
}
