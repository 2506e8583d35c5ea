//! Tree diagrams as LaTeX
//!
//! Emits a standalone document drawing a [`Tree`] with the `forest`
//! package. Compiles with `pdflatex`.

use std::path::{Path, PathBuf};

use crate::tree::Tree;

/// Standalone LaTeX document for a tree
pub fn to_latex(tree: &Tree) -> String {
    format!(
        "\\documentclass[border=5pt]{{standalone}}\n\n\
         \\usepackage[T1]{{fontenc}}\n\
         \\usepackage{{tikz}}\n\
         \\usepackage{{forest}}\n\n\
         \\begin{{document}}\n\n\
         {}\n\n\
         \\end{{document}}\n",
        forest_picture(tree)
    )
}

/// `forest` environment holding the tree
pub fn forest_picture(tree: &Tree) -> String {
    format!(
        "\\begin{{forest}}for tree={{rectangle,draw, l sep=20pt}}{};\n\\end{{forest}}",
        bracket(tree)
    )
}

/// Bracket notation: `[{label} children...]`
///
/// Childless nonterminals are epsilon expansions and get an explicit
/// epsilon leaf.
fn bracket(tree: &Tree) -> String {
    let mut out = format!("[{{{}}} ", escape(&tree.label.to_string()));
    if tree.children.is_empty() && !tree.is_terminal() {
        out.push_str("[{$\\varepsilon$}]");
    }
    for child in &tree.children {
        out.push_str(&bracket(child));
    }
    out.push(']');
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '$' | '&' | '#' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '<' => out.push_str("\\textless{}"),
            '>' => out.push_str("\\textgreater{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Where the AST diagram goes: `tree.tex` becomes `tree_AST.tex`
pub fn ast_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_AST.{}", stem, ext.to_string_lossy()),
        None => format!("{}_AST", stem),
    };
    path.with_file_name(name)
}
