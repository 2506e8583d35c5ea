//! ALGOL-0 Code Generator
//!
//! Lowers a [`Program`] to textual LLVM IR in a single pass. Output is
//! written line by line in program order, so the sink only ever sees
//! appends.
//!
//! Register numbering follows evaluation order: a subexpression's
//! operands are lowered before its own result register is taken, and
//! integer literals are used as immediates without consuming a register.
//! Block labels carry a per-construct counter (`whileCond0`, `ifCode3`)
//! that advances only when a construct is actually emitted.

use std::collections::HashSet;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::ast::{Expr, Program, Statement, UnaryOp};
use crate::ir::{binary_opcode, Label, Operand, Reg, Slot};
use crate::Result;

/// Runtime helpers and the head of `main`, emitted once per module
pub const PRELUDE: &str = concat!(
    "@.strP = private unnamed_addr constant [4 x i8] c\"%d\\0A\\00\", align 1\n",
    "\n",
    "; Function Attrs: nounwind uwtable\n",
    "define void @println(i32 %x) #0 {\n",
    "\t%1 = alloca i32, align 4\n",
    "\tstore i32 %x, i32* %1, align 4\n",
    "\t%2 = load i32, i32* %1, align 4\n",
    "\t%3 = call i32 (i8*, ...) @printf(i8* getelementptr inbounds ([4 x i8], [4 x i8]* @.strP, i32 0, i32 0), i32 %2)\n",
    "\tret void\n",
    "}\n",
    "\n",
    "declare i32 @printf(i8*, ...) #1\n",
    "\n",
    "declare i32 @getchar()\n",
    "\n",
    "define i32 @readInt() {\n",
    "entry:\n",
    "\t%res = alloca i32\n",
    "\tstore i32 0, i32* %res\n",
    "\n",
    "\t%isNegative = alloca i1\n",
    "\t%number = alloca i32\n",
    "\t%0 = call i32 @getchar()\n",
    "\t\n",
    "\t%1 = icmp eq i32 %0, 45\n",
    "\tstore i1 %1, i1* %isNegative\n",
    "\tbr i1 %1, label %loop, label %firstIteration\n",
    "firstIteration:\n",
    "\t%2 = sub i32 %0, 48\n",
    "\tstore i32 %2, i32* %number\n",
    "\n",
    "\t%3 = icmp sge i32 %2, 0\n",
    "\t%4 = icmp sle i32 %2, 9\n",
    "\t%5 = and i1 %3, %4\n",
    "\tbr i1 %5, label %continue, label %exit\n",
    "loop:\n",
    "\t%6 = call i32 @getchar()\n",
    "\t%7 = sub i32 %6, 48\n",
    "\tstore i32 %7, i32* %number\n",
    "\n",
    "\t%8 = icmp sge i32 %7, 0\n",
    "\t%9 = icmp sle i32 %7, 9\n",
    "\t%10 = and i1 %8, %9\n",
    "\tbr i1 %10, label %continue, label %exit\n",
    "continue:\n",
    "\t%11 = load i32, i32* %res\n",
    "\t%12 = mul i32 %11, 10\n",
    "\t%13 = load i32, i32* %number\n",
    "\t%14 = add i32 %12, %13 \n",
    "\tstore i32 %14, i32* %res\n",
    "\n",
    "\tbr label %loop\n",
    "exit:\n",
    "\n",
    "\t%15 = load i1, i1* %isNegative\n",
    "\tbr i1 %15, label %ifNegative, label %endifNegative\n",
    "\n",
    "ifNegative:\n",
    "\t%16 = load i32, i32* %res\n",
    "\t%17 = mul i32 %16, -1\n",
    "\tstore i32 %17, i32* %res\n",
    "\n",
    "\tbr label %endifNegative\n",
    "endifNegative:\n",
    "\t%18 = load i32, i32* %res\n",
    "\tret i32 %18\n",
    "}\n",
    "\n",
    "\n",
    "define i32 @main() {\n",
    "entry:\n",
);

/// Where generated IR goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// Truncated when the compiler is created
    File(PathBuf),
}

/// One compilation session
///
/// Owns the register counter, the per-construct label counters and the
/// set of variables that already have a stack slot. Consumed by
/// [`Compiler::compile`], so a session can never be reused.
pub struct Compiler<W: Write> {
    out: W,
    next_reg: usize,
    if_index: usize,
    while_index: usize,
    for_index: usize,
    variables: HashSet<String>,
}

impl Compiler<Box<dyn Write>> {
    /// Open a destination, truncating a named file up front
    pub fn to_destination(destination: &Destination) -> Result<Self> {
        let out: Box<dyn Write> = match destination {
            Destination::Stdout => Box::new(BufWriter::new(io::stdout())),
            Destination::File(path) => Box::new(BufWriter::new(File::create(path)?)),
        };
        Ok(Compiler::new(out))
    }
}

impl<W: Write> Compiler<W> {
    pub fn new(out: W) -> Self {
        Compiler {
            out,
            next_reg: 0,
            if_index: 0,
            while_index: 0,
            for_index: 0,
            variables: HashSet::new(),
        }
    }

    /// Emit the whole module and hand back the flushed writer
    pub fn compile(mut self, program: &Program) -> Result<W> {
        debug!(statements = program.body.len(), "generating LLVM IR");

        self.emit(PRELUDE)?;
        self.block(&program.body)?;
        self.emit("ret i32 0")?;
        self.emit("}")?;
        self.out.flush()?;

        info!(
            registers = self.next_reg,
            variables = self.variables.len(),
            "generated LLVM IR"
        );
        Ok(self.out)
    }

    fn emit(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn blank(&mut self) -> Result<()> {
        self.emit("")
    }

    fn label(&mut self, label: Label) -> Result<()> {
        self.emit(format_args!("{}:", label))
    }

    fn fresh(&mut self) -> Reg {
        let reg = Reg(self.next_reg);
        self.next_reg += 1;
        reg
    }

    /// Give a variable its stack slot on first reference
    fn declare(&mut self, name: &str) -> Result<()> {
        if self.variables.insert(name.to_string()) {
            self.emit(format_args!("{} = alloca i32", Slot(name)))?;
        }
        Ok(())
    }

    fn block(&mut self, body: &[Statement]) -> Result<()> {
        for statement in body {
            self.statement(statement)?;
            self.blank()?;
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Assign { target, value } => self.assign(&target.name, value),
            Statement::Read(var) => self.read(&var.name),
            Statement::Print(var) => self.print(&var.name),
            Statement::If {
                cond,
                then_body,
                else_body,
                ..
            } => self.if_statement(cond, then_body, else_body.as_deref()),
            Statement::While { cond, body, .. } => self.while_loop(cond, body),
            Statement::For {
                var,
                from,
                by,
                to,
                body,
            } => self.for_loop(&var.name, from, by, to, body),
        }
    }

    fn assign(&mut self, name: &str, value: &Expr) -> Result<()> {
        self.declare(name)?;
        let value = self.operand(value)?;
        self.emit(format_args!("store i32 {}, i32* {}", value, Slot(name)))
    }

    fn read(&mut self, name: &str) -> Result<()> {
        self.declare(name)?;
        let reg = self.fresh();
        self.emit(format_args!("{} = call i32 @readInt()", reg))?;
        self.emit(format_args!("store i32 {}, i32* {}", reg, Slot(name)))
    }

    fn print(&mut self, name: &str) -> Result<()> {
        let reg = self.load(name)?;
        self.emit(format_args!("call void @println(i32 {})", reg))
    }

    fn load(&mut self, name: &str) -> Result<Reg> {
        let reg = self.fresh();
        self.emit(format_args!("{} = load i32, i32* {}", reg, Slot(name)))?;
        Ok(reg)
    }

    fn if_statement(
        &mut self,
        cond: &Expr,
        then_body: &[Statement],
        else_body: Option<&[Statement]>,
    ) -> Result<()> {
        if then_body.is_empty() && else_body.map_or(true, <[Statement]>::is_empty) {
            debug!("eliding if with empty arms");
            return Ok(());
        }
        let index = self.if_index;
        self.if_index += 1;

        let then_label = Label::if_code(index);
        let end_label = Label::end_if(index);
        let false_label = if else_body.is_some() {
            Label::else_code(index)
        } else {
            end_label
        };

        let cond = self.operand(cond)?;
        self.emit(format_args!(
            "\nbr i1 {}, {}, {}",
            cond,
            then_label.target(),
            false_label.target()
        ))?;

        self.label(then_label)?;
        self.block(then_body)?;
        self.emit(format_args!("br {}", end_label.target()))?;

        if let Some(else_body) = else_body {
            self.label(false_label)?;
            self.block(else_body)?;
            self.emit(format_args!("br {}", end_label.target()))?;
        }

        self.label(end_label)
    }

    fn while_loop(&mut self, cond: &Expr, body: &[Statement]) -> Result<()> {
        if body.is_empty() {
            debug!("eliding while with empty body");
            return Ok(());
        }
        let index = self.while_index;
        self.while_index += 1;

        let cond_label = Label::while_cond(index);
        let body_label = Label::while_code(index);
        let end_label = Label::end_while(index);

        self.emit(format_args!("br {}", cond_label.target()))?;
        self.label(cond_label)?;
        let cond = self.operand(cond)?;
        self.emit(format_args!(
            "\nbr i1 {}, {}, {}",
            cond,
            body_label.target(),
            end_label.target()
        ))?;

        self.label(body_label)?;
        self.block(body)?;
        self.emit(format_args!("br {}", cond_label.target()))?;
        self.label(end_label)
    }

    /// `for v from a by b to c` loops while `v < c`
    ///
    /// The step is added to the value loaded for the bound check at the top
    /// of the iteration.
    fn for_loop(
        &mut self,
        var: &str,
        from: &Expr,
        by: &Expr,
        to: &Expr,
        body: &[Statement],
    ) -> Result<()> {
        if body.is_empty() {
            debug!(var, "eliding for with empty body");
            return Ok(());
        }
        let index = self.for_index;
        self.for_index += 1;

        let cond_label = Label::for_cond(index);
        let body_label = Label::for_code(index);
        let end_label = Label::end_for(index);

        self.assign(var, from)?;
        self.emit(format_args!("br {}", cond_label.target()))?;

        self.label(cond_label)?;
        let current = self.load(var)?;
        let bound = self.operand(to)?;
        let cond = self.fresh();
        self.emit(format_args!("{} = icmp slt i32 {}, {}", cond, current, bound))?;
        self.emit(format_args!(
            "\nbr i1 {}, {}, {}",
            cond,
            body_label.target(),
            end_label.target()
        ))?;

        self.label(body_label)?;
        self.block(body)?;
        let step = self.operand(by)?;
        let next = self.fresh();
        self.emit(format_args!("{} = add i32 {}, {}", next, current, step))?;
        self.emit(format_args!("store i32 {}, i32* {}", next, Slot(var)))?;
        self.emit(format_args!("br {}", cond_label.target()))?;
        self.label(end_label)
    }

    /// Lower an expression to the operand holding its value
    fn operand(&mut self, expr: &Expr) -> Result<Operand> {
        match expr {
            Expr::IntLit(value) => Ok(Operand::Imm(*value)),
            Expr::Var(id) => self.load(&id.name).map(Operand::from),
            Expr::Binary { left, op, right } => {
                let left = self.operand(left)?;
                let right = self.operand(right)?;
                let (opcode, ty) = binary_opcode(*op);
                let dest = self.fresh();
                self.emit(format_args!("{} = {} {} {}, {}", dest, opcode, ty, left, right))?;
                Ok(dest.into())
            }
            Expr::Unary { op, operand } => {
                let operand = self.operand(operand)?;
                let dest = self.fresh();
                match op {
                    UnaryOp::Not => self.emit(format_args!("{} = sub i1 1, {}", dest, operand))?,
                    UnaryOp::Neg => self.emit(format_args!("{} = sub i32 0, {}", dest, operand))?,
                }
                Ok(dest.into())
            }
        }
    }
}

/// Compile a program to an in-memory IR string
pub fn generate(program: &Program) -> Result<String> {
    let bytes = Compiler::new(Vec::new()).compile(program)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
