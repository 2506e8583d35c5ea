//! ALGOL-0 Grammar
//!
//! The numbered LL(1) rule table and leftmost-derivation recovery from a
//! derivation tree. Rule numbers are stable: they are what the `--trace`
//! output prints.

use crate::token::TokenKind;
use crate::tree::{ParseTree, Variable};
use crate::{CompileError, Result};

/// A numbered production
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarRule {
    pub number: usize,
    pub lhs: Variable,
    pub rhs: &'static str,
}

impl GrammarRule {
    const fn new(number: usize, lhs: Variable, rhs: &'static str) -> Self {
        GrammarRule { number, lhs, rhs }
    }
}

impl std::fmt::Display for GrammarRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.rhs)
    }
}

/// All productions, indexed by `number - 1`
pub const RULES: [GrammarRule; 46] = [
    GrammarRule::new(1, Variable::Program, "begin <Code> end"),
    GrammarRule::new(2, Variable::Code, "ε"),
    GrammarRule::new(3, Variable::Code, "<InstList>"),
    GrammarRule::new(4, Variable::InstList, "<Instruction> <NextInst>"),
    GrammarRule::new(5, Variable::NextInst, "ε"),
    GrammarRule::new(6, Variable::NextInst, "; <InstList>"),
    GrammarRule::new(7, Variable::Instruction, "<Assign>"),
    GrammarRule::new(8, Variable::Instruction, "<If>"),
    GrammarRule::new(9, Variable::Instruction, "<While>"),
    GrammarRule::new(10, Variable::Instruction, "<For>"),
    GrammarRule::new(11, Variable::Instruction, "<Print>"),
    GrammarRule::new(12, Variable::Instruction, "<Read>"),
    GrammarRule::new(13, Variable::Assign, "[VarName] := <ExprArith>"),
    GrammarRule::new(14, Variable::ExprArith, "<Prod> <ExprArith'>"),
    GrammarRule::new(15, Variable::ExprArithPrime, "+ <Prod> <ExprArith'>"),
    GrammarRule::new(16, Variable::ExprArithPrime, "- <Prod> <ExprArith'>"),
    GrammarRule::new(17, Variable::ExprArithPrime, "ε"),
    GrammarRule::new(18, Variable::Prod, "<Atom> <Prod'>"),
    GrammarRule::new(19, Variable::ProdPrime, "* <Atom> <Prod'>"),
    GrammarRule::new(20, Variable::ProdPrime, "/ <Atom> <Prod'>"),
    GrammarRule::new(21, Variable::ProdPrime, "ε"),
    GrammarRule::new(22, Variable::Atom, "- <Atom>"),
    GrammarRule::new(23, Variable::Atom, "[Number]"),
    GrammarRule::new(24, Variable::Atom, "[VarName]"),
    GrammarRule::new(25, Variable::Atom, "( <ExprArith> )"),
    GrammarRule::new(26, Variable::If, "if <Cond> then <Code> <IfSeq>"),
    GrammarRule::new(27, Variable::IfSeq, "endif"),
    GrammarRule::new(28, Variable::IfSeq, "else <Code> endif"),
    GrammarRule::new(29, Variable::Cond, "<CondAnd> <Cond'>"),
    GrammarRule::new(30, Variable::CondPrime, "or <CondAnd> <Cond'>"),
    GrammarRule::new(31, Variable::CondPrime, "ε"),
    GrammarRule::new(32, Variable::CondAnd, "<SimpleCond> <CondAnd'>"),
    GrammarRule::new(33, Variable::CondAndPrime, "and <SimpleCond> <CondAnd'>"),
    GrammarRule::new(34, Variable::CondAndPrime, "ε"),
    GrammarRule::new(35, Variable::SimpleCond, "<ExprArith> <Comp> <ExprArith>"),
    GrammarRule::new(36, Variable::SimpleCond, "not <SimpleCond>"),
    GrammarRule::new(37, Variable::Comp, "="),
    GrammarRule::new(38, Variable::Comp, ">="),
    GrammarRule::new(39, Variable::Comp, ">"),
    GrammarRule::new(40, Variable::Comp, "<="),
    GrammarRule::new(41, Variable::Comp, "<"),
    GrammarRule::new(42, Variable::Comp, "/="),
    GrammarRule::new(43, Variable::While, "while <Cond> do <Code> endwhile"),
    GrammarRule::new(
        44,
        Variable::For,
        "for [VarName] from <ExprArith> by <ExprArith> to <ExprArith> do <Code> endwhile",
    ),
    GrammarRule::new(45, Variable::Print, "print ( [VarName] )"),
    GrammarRule::new(46, Variable::Read, "read ( [VarName] )"),
];

/// Look up a production by its number
pub fn rule(number: usize) -> Option<&'static GrammarRule> {
    number.checked_sub(1).and_then(|i| RULES.get(i))
}

/// Export the rule table as numbered BNF, one production per line
pub fn to_bnf() -> String {
    let mut output = String::new();
    for rule in &RULES {
        output.push_str(&format!("[{:>2}] {}\n", rule.number, rule));
    }
    output
}

/// Rule numbers of the leftmost derivation that produced `tree`
pub fn derivation(tree: &ParseTree) -> Result<Vec<usize>> {
    let mut rules = Vec::new();
    collect(tree, &mut rules)?;
    Ok(rules)
}

fn collect(tree: &ParseTree, rules: &mut Vec<usize>) -> Result<()> {
    let Some(variable) = tree.variable() else {
        return Ok(());
    };
    rules.push(rule_number(variable, tree)?);
    for child in &tree.children {
        collect(child, rules)?;
    }
    Ok(())
}

fn rule_number(variable: Variable, tree: &ParseTree) -> Result<usize> {
    let first = tree.children.first();
    let first_kind = first.and_then(|child| child.token_kind());
    let empty = tree.children.is_empty();

    let number = match variable {
        Variable::Program => 1,
        Variable::Code => if empty { 2 } else { 3 },
        Variable::InstList => 4,
        Variable::NextInst => if empty { 5 } else { 6 },
        Variable::Instruction => match first.and_then(|child| child.variable()) {
            Some(Variable::Assign) => 7,
            Some(Variable::If) => 8,
            Some(Variable::While) => 9,
            Some(Variable::For) => 10,
            Some(Variable::Print) => 11,
            Some(Variable::Read) => 12,
            _ => return Err(unexpected(variable, tree)),
        },
        Variable::Assign => 13,
        Variable::ExprArith => 14,
        Variable::ExprArithPrime => match first_kind {
            Some(TokenKind::Plus) => 15,
            Some(TokenKind::Minus) => 16,
            None if empty => 17,
            _ => return Err(unexpected(variable, tree)),
        },
        Variable::Prod => 18,
        Variable::ProdPrime => match first_kind {
            Some(TokenKind::Times) => 19,
            Some(TokenKind::Divide) => 20,
            None if empty => 21,
            _ => return Err(unexpected(variable, tree)),
        },
        Variable::Atom => match first_kind {
            Some(TokenKind::Minus) => 22,
            Some(TokenKind::Number) => 23,
            Some(TokenKind::VarName) => 24,
            Some(TokenKind::LeftParenthesis) => 25,
            _ => return Err(unexpected(variable, tree)),
        },
        Variable::If => 26,
        Variable::IfSeq => match first_kind {
            Some(TokenKind::EndIf) => 27,
            Some(TokenKind::Else) => 28,
            _ => return Err(unexpected(variable, tree)),
        },
        Variable::Cond => 29,
        Variable::CondPrime => if empty { 31 } else { 30 },
        Variable::CondAnd => 32,
        Variable::CondAndPrime => if empty { 34 } else { 33 },
        Variable::SimpleCond => match first_kind {
            Some(TokenKind::Not) => 36,
            _ => 35,
        },
        Variable::Comp => match first_kind {
            Some(TokenKind::Equal) => 37,
            Some(TokenKind::GreaterEqual) => 38,
            Some(TokenKind::Greater) => 39,
            Some(TokenKind::SmallerEqual) => 40,
            Some(TokenKind::Smaller) => 41,
            Some(TokenKind::Different) => 42,
            _ => return Err(unexpected(variable, tree)),
        },
        Variable::While => 43,
        Variable::For => 44,
        Variable::Print => 45,
        Variable::Read => 46,
    };
    Ok(number)
}

fn unexpected(variable: Variable, tree: &ParseTree) -> CompileError {
    let found = tree
        .children
        .first()
        .map(|child| child.label.to_string())
        .unwrap_or_else(|| "nothing".to_string());
    CompileError::malformed(format!("no production of {} starts with {}", variable, found))
}

/// Render a derivation as the parser trace
///
/// Verbose output prints one `[n] lhs -> rhs` line per step; otherwise the
/// rule numbers are joined by spaces.
pub fn render_trace(rules: &[usize], verbose: bool) -> String {
    if !verbose {
        let numbers: Vec<String> = rules.iter().map(ToString::to_string).collect();
        return numbers.join(" ");
    }

    let mut output = String::new();
    for &number in rules {
        match rule(number) {
            Some(rule) => output.push_str(&format!("[{}] {}\n", number, rule)),
            None => output.push_str(&format!("[{}]\n", number)),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_rule_table_is_numbered_in_order() {
        for (i, rule) in RULES.iter().enumerate() {
            assert_eq!(rule.number, i + 1);
        }
        assert_eq!(rule(0), None);
        assert_eq!(rule(47), None);
        assert_eq!(rule(13).map(|r| r.lhs), Some(Variable::Assign));
    }

    #[test]
    fn test_derivation_of_empty_program() {
        let tree = parse("begin end").unwrap();
        assert_eq!(derivation(&tree).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_derivation_of_assignment() {
        let tree = parse("begin x := 1 + y end").unwrap();
        assert_eq!(
            derivation(&tree).unwrap(),
            vec![1, 3, 4, 7, 13, 14, 18, 23, 21, 15, 18, 24, 21, 17, 5]
        );
    }

    #[test]
    fn test_derivation_of_condition() {
        let tree = parse("begin if not a < 2 then print(a) endif end").unwrap();
        let rules = derivation(&tree).unwrap();
        assert_eq!(&rules[..6], &[1, 3, 4, 8, 26, 29]);
        assert_eq!(&rules[6..8], &[32, 36]);
        assert!(rules.contains(&41));
        assert!(rules.contains(&27));
        assert!(rules.contains(&45));
    }

    #[test]
    fn test_render_trace() {
        assert_eq!(render_trace(&[1, 2], false), "1 2");
        assert_eq!(
            render_trace(&[1, 2], true),
            "[1] <Program> -> begin <Code> end\n[2] <Code> -> ε\n"
        );
    }

    #[test]
    fn test_bnf_export_lists_every_rule() {
        let bnf = to_bnf();
        assert_eq!(bnf.lines().count(), RULES.len());
        assert!(bnf.starts_with("[ 1] <Program> -> begin <Code> end\n"));
    }
}
