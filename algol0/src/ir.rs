//! IR Type Definitions
//!
//! Small value types the code generator prints into LLVM IR text:
//! virtual registers, variable slots, block labels, operands and opcodes.

use std::fmt;

use crate::ast::BinaryOp;

/// Numbered virtual register (`%0`, `%1`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(pub usize);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Stack slot of a source variable (`%x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot<'a>(pub &'a str);

impl fmt::Display for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Basic block label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    prefix: &'static str,
    index: usize,
}

impl Label {
    pub fn if_code(index: usize) -> Self {
        Label { prefix: "ifCode", index }
    }

    pub fn else_code(index: usize) -> Self {
        Label { prefix: "elseCode", index }
    }

    pub fn end_if(index: usize) -> Self {
        Label { prefix: "endif", index }
    }

    pub fn while_cond(index: usize) -> Self {
        Label { prefix: "whileCond", index }
    }

    pub fn while_code(index: usize) -> Self {
        Label { prefix: "whileCode", index }
    }

    pub fn end_while(index: usize) -> Self {
        Label { prefix: "endwhile", index }
    }

    pub fn for_cond(index: usize) -> Self {
        Label { prefix: "forCond", index }
    }

    pub fn for_code(index: usize) -> Self {
        Label { prefix: "forCode", index }
    }

    pub fn end_for(index: usize) -> Self {
        Label { prefix: "endfor", index }
    }

    /// Reference form used in branch targets (`label %whileCond0`)
    pub fn target(&self) -> String {
        format!("label %{}", self)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.index)
    }
}

/// Value operand: an immediate or a register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Imm(i32),
    Reg(Reg),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(value) => write!(f, "{}", value),
            Operand::Reg(reg) => write!(f, "{}", reg),
        }
    }
}

impl From<Reg> for Operand {
    fn from(reg: Reg) -> Self {
        Operand::Reg(reg)
    }
}

/// Value types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrType {
    /// Booleans, the result of comparisons
    I1,
    I32,
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I1 => write!(f, "i1"),
            IrType::I32 => write!(f, "i32"),
        }
    }
}

/// Instruction and operand type for a source operator
///
/// Comparisons take `i32` operands and yield `i1`; `and`/`or` combine `i1`
/// values.
pub fn binary_opcode(op: BinaryOp) -> (&'static str, IrType) {
    match op {
        BinaryOp::Add => ("add", IrType::I32),
        BinaryOp::Sub => ("sub", IrType::I32),
        BinaryOp::Mul => ("mul", IrType::I32),
        BinaryOp::Div => ("sdiv", IrType::I32),
        BinaryOp::Eq => ("icmp eq", IrType::I32),
        BinaryOp::Ne => ("icmp ne", IrType::I32),
        BinaryOp::Gt => ("icmp sgt", IrType::I32),
        BinaryOp::Ge => ("icmp sge", IrType::I32),
        BinaryOp::Lt => ("icmp slt", IrType::I32),
        BinaryOp::Le => ("icmp sle", IrType::I32),
        BinaryOp::And => ("and", IrType::I1),
        BinaryOp::Or => ("or", IrType::I1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Reg(3).to_string(), "%3");
        assert_eq!(Slot("count").to_string(), "%count");
        assert_eq!(Operand::Imm(-4).to_string(), "-4");
        assert_eq!(Operand::from(Reg(0)).to_string(), "%0");
        assert_eq!(Label::while_cond(2).to_string(), "whileCond2");
        assert_eq!(Label::end_for(0).target(), "label %endfor0");
    }

    #[test]
    fn test_binary_opcodes() {
        assert_eq!(binary_opcode(BinaryOp::Div), ("sdiv", IrType::I32));
        assert_eq!(binary_opcode(BinaryOp::Ge), ("icmp sge", IrType::I32));
        assert_eq!(binary_opcode(BinaryOp::Or), ("or", IrType::I1));
    }
}
