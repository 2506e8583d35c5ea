//! ALGOL-0 Compiler CLI
//!
//! A command-line interface for the ALGOL-0 compiler.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use tracing::{debug, info, Level};

use algol0::ast::Program;
use algol0::codegen::{Compiler, Destination};
use algol0::error::Diagnostic;
use algol0::lint::LintWarning;
use algol0::tree::Tree;
use algol0::{builder, fmt, grammar, lexer, lint, parser, rearrange, tex, CompileError};

#[derive(Parser)]
#[command(name = "algol0c")]
#[command(version)]
#[command(about = "ALGOL-0 Compiler - emits LLVM IR", long_about = None)]
struct Cli {
    /// Log pipeline stages (DEBUG level) and print verbose traces
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// How diagnostics are printed
    #[arg(long, value_enum, default_value_t = MessageFormat::Human, global = true)]
    message_format: MessageFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an ALGOL-0 source file to LLVM IR
    Compile {
        /// Input ALGOL-0 source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to emit
        #[arg(long, value_enum, default_value_t = Emit::Ir)]
        emit: Emit,

        /// Write the derivation tree as LaTeX here, and the AST next to it
        #[arg(long, value_name = "TEX")]
        tex: Option<PathBuf>,

        /// Print the rule numbers of the leftmost derivation
        #[arg(long)]
        trace: bool,
    },

    /// Parse, build and lint a source file without generating code
    Check {
        /// Input ALGOL-0 source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the token stream and the identifier table
    Lex {
        /// Input ALGOL-0 source file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the numbered grammar rules used by `--trace`
    Grammar,

    /// Compile and execute with llvm-as and lli
    Run {
        /// Input ALGOL-0 source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Keep the generated .ll and .bc files
        #[arg(long)]
        keep: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// LLVM IR
    Ir,
    /// The rearranged AST, printed back as fully parenthesized source
    Ast,
    /// The filtered tree before rearrangement
    Draft,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MessageFormat {
    Human,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let reporter = Reporter {
        format: cli.message_format,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Compile {
            file,
            output,
            emit,
            tex,
            trace,
        } => cmd_compile(&reporter, &file, output, emit, tex, trace),
        Commands::Check { file } => cmd_check(&reporter, &file),
        Commands::Lex { file } => cmd_lex(&reporter, &file),
        Commands::Grammar => {
            print!("{}", grammar::to_bnf());
            ExitCode::SUCCESS
        }
        Commands::Run { file, keep } => cmd_run(&reporter, &file, keep),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints diagnostics in the selected format
struct Reporter {
    format: MessageFormat,
    verbose: bool,
}

impl Reporter {
    fn error(&self, error: &CompileError, file: &Path, source: &str) {
        if error.is_internal() {
            tracing::error!(file = %file.display(), "{}", error);
        }
        let diag = Diagnostic::from(error).with_file(file.display().to_string());
        self.diagnostic(&diag, source);
    }

    fn warnings(&self, warnings: &[LintWarning], file: &Path, source: &str) {
        for warning in warnings {
            let diag = Diagnostic::from(warning).with_file(file.display().to_string());
            self.diagnostic(&diag, source);
        }
    }

    fn diagnostic(&self, diag: &Diagnostic, source: &str) {
        if self.format == MessageFormat::Json {
            eprintln!("{}", diag.to_json());
            return;
        }

        let formatted = diag.format_with_source(source);
        for line in formatted.lines() {
            if line.starts_with("error") {
                eprintln!("{}", line.red().bold());
            } else if line.starts_with("warning") {
                eprintln!("{}", line.yellow().bold());
            } else if line.contains("help:") {
                eprintln!("{}", line.cyan());
            } else if line.contains("note:") {
                eprintln!("{}", line.yellow());
            } else {
                eprintln!("{}", line);
            }
        }
    }

    /// Failure outside any source file (I/O, missing tools)
    fn fatal(&self, message: impl std::fmt::Display) {
        eprintln!("{}: {}", "error".red().bold(), message);
    }
}

fn read_source(reporter: &Reporter, file: &Path) -> Option<String> {
    match fs::read_to_string(file) {
        Ok(s) => Some(s),
        Err(e) => {
            reporter.fatal(format!("could not read '{}': {}", file.display(), e));
            None
        }
    }
}

/// Everything the front end produces for one source file
struct FrontEnd {
    parse_tree: Tree,
    draft: Tree,
    rearranged: Tree,
    program: Program,
}

fn front_end(source: &str) -> algol0::Result<FrontEnd> {
    let parse_tree = parser::parse(source)?;
    let draft = builder::build(&parse_tree)?;
    let rearranged = rearrange::rearrange(draft.clone())?;
    let program = Program::try_from(&rearranged)?;
    Ok(FrontEnd {
        parse_tree,
        draft,
        rearranged,
        program,
    })
}

fn cmd_compile(
    reporter: &Reporter,
    file: &Path,
    output: Option<PathBuf>,
    emit: Emit,
    tex_path: Option<PathBuf>,
    trace: bool,
) -> ExitCode {
    let Some(source) = read_source(reporter, file) else {
        return ExitCode::FAILURE;
    };

    let front = match front_end(&source) {
        Ok(front) => front,
        Err(e) => {
            reporter.error(&e, file, &source);
            return ExitCode::FAILURE;
        }
    };

    if trace {
        match grammar::derivation(&front.parse_tree) {
            Ok(rules) => eprintln!("{}", grammar::render_trace(&rules, reporter.verbose)),
            Err(e) => {
                reporter.error(&e, file, &source);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(path) = tex_path {
        if let Err(e) = write_diagrams(&path, &front) {
            reporter.fatal(e);
            return ExitCode::FAILURE;
        }
    }

    reporter.warnings(&lint::lint(&front.program), file, &source);

    let text = match emit {
        Emit::Ast => Some(fmt::format_program(&front.program)),
        Emit::Draft => Some(front.draft.outline()),
        Emit::Ir => None,
    };
    let result = match text {
        Some(text) => write_text(output.as_deref(), &text),
        None => emit_ir(output.clone(), &front.program),
    };

    match result {
        Ok(()) => {
            if let Some(path) = output {
                println!(
                    "{} {} -> {}",
                    "Compiled".green().bold(),
                    file.display(),
                    path.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            reporter.error(&e, file, &source);
            ExitCode::FAILURE
        }
    }
}

fn write_diagrams(path: &Path, front: &FrontEnd) -> algol0::Result<()> {
    fs::write(path, tex::to_latex(&front.parse_tree))?;
    let ast_path = tex::ast_path(path);
    fs::write(&ast_path, tex::to_latex(&front.rearranged))?;
    info!(tree = %path.display(), ast = %ast_path.display(), "wrote LaTeX diagrams");
    Ok(())
}

fn write_text(output: Option<&Path>, text: &str) -> algol0::Result<()> {
    match output {
        Some(path) => fs::write(path, text)?,
        None => print!("{}", text),
    }
    Ok(())
}

fn emit_ir(output: Option<PathBuf>, program: &Program) -> algol0::Result<()> {
    let destination = match output {
        Some(path) => Destination::File(path),
        None => Destination::Stdout,
    };
    debug!(?destination, "emitting IR");
    Compiler::to_destination(&destination)?.compile(program)?;
    Ok(())
}

fn cmd_check(reporter: &Reporter, file: &Path) -> ExitCode {
    let Some(source) = read_source(reporter, file) else {
        return ExitCode::FAILURE;
    };

    match front_end(&source) {
        Ok(front) => {
            let warnings = lint::lint(&front.program);
            reporter.warnings(&warnings, file, &source);
            println!(
                "{} {} ({} statements, {} warnings)",
                "Checked".green().bold(),
                file.display(),
                front.program.body.len(),
                warnings.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            reporter.error(&e, file, &source);
            ExitCode::FAILURE
        }
    }
}

fn cmd_lex(reporter: &Reporter, file: &Path) -> ExitCode {
    let Some(source) = read_source(reporter, file) else {
        return ExitCode::FAILURE;
    };

    let tokens = match lexer::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            reporter.error(&e, file, &source);
            return ExitCode::FAILURE;
        }
    };

    for token in &tokens {
        println!("{}", token);
    }
    println!();
    println!("{}", "Identifiers".bold());
    for token in lexer::identifier_table(&tokens) {
        println!("{}\t{}", token.text(), token.line);
    }
    ExitCode::SUCCESS
}

fn cmd_run(reporter: &Reporter, file: &Path, keep: bool) -> ExitCode {
    let Some(source) = read_source(reporter, file) else {
        return ExitCode::FAILURE;
    };

    let program = match algol0::build_ast(&source) {
        Ok(program) => program,
        Err(e) => {
            reporter.error(&e, file, &source);
            return ExitCode::FAILURE;
        }
    };
    reporter.warnings(&lint::lint(&program), file, &source);

    let (llvm_as, lli) = match (which::which("llvm-as"), which::which("lli")) {
        (Ok(llvm_as), Ok(lli)) => (llvm_as, lli),
        _ => {
            reporter.fatal("`llvm-as` and `lli` must be on PATH to run programs");
            return ExitCode::FAILURE;
        }
    };

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "program".to_string());
    let base = std::env::temp_dir().join(format!("{}-{}", stem, std::process::id()));
    let ll = base.with_extension("ll");
    let bc = base.with_extension("bc");

    let status = execute(&program, &llvm_as, &lli, &ll, &bc);

    if keep {
        println!("{} {} {}", "Kept".green().bold(), ll.display(), bc.display());
    } else {
        let _ = fs::remove_file(&ll);
        let _ = fs::remove_file(&bc);
    }

    match status {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            reporter.fatal(e);
            ExitCode::FAILURE
        }
    }
}

/// Assemble and interpret; `Ok(false)` when the program itself failed
fn execute(
    program: &Program,
    llvm_as: &Path,
    lli: &Path,
    ll: &Path,
    bc: &Path,
) -> algol0::Result<bool> {
    Compiler::to_destination(&Destination::File(ll.to_path_buf()))?.compile(program)?;

    let assembled = Command::new(llvm_as).arg(ll).arg("-o").arg(bc).status()?;
    if !assembled.success() {
        return Err(CompileError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("llvm-as rejected the generated IR in {}", ll.display()),
        )));
    }

    let status = Command::new(lli).arg(bc).status()?;
    debug!(code = ?status.code(), "program exited");
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_subcommand() {
        let cli = Cli::try_parse_from(["algol0c", "grammar"]).unwrap();
        assert!(matches!(cli.command, Commands::Grammar));
    }

    #[test]
    fn test_compile_flags() {
        let cli = Cli::try_parse_from([
            "algol0c", "compile", "prog.algol", "--emit", "ast", "--trace", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Compile { emit, trace, output, .. } => {
                assert!(emit == Emit::Ast);
                assert!(trace);
                assert_eq!(output, None);
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["algol0c", "-v", "-q", "grammar"]).is_err());
    }
}
