use super::{Address, Command, Link, Opcode, SymbolTable, MEMORY_SIZE};
use crate::error;
use crate::lang::ast::{
    AssignOp, BinOp, CmpOp, Condition, Expression, Statement, StepOp, Variable,
};
use crate::lang::Error;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Code generator
///
/// Lowers a program to a flat command sequence for the machine. Generation
/// is bottom-up: expressions and conditions become self-contained blocks
/// whose jump targets are block-relative tags, and constructs assemble and
/// resolve those blocks once their lengths are known.
///
/// Binary operands that don't fit the single accumulator spill to a fixed
/// pool of scratch cells. The pool size is computed in a pre-pass over the
/// whole program and the cells are allocated before any user variable, one
/// per concurrent spill level.
pub fn codegen(program: &[Statement]) -> Result<Listing> {
    let mut gen = Generator::new(program)?;
    let mut block = Link::new();
    for statement in program {
        let code = gen
            .statement(statement)
            .map_err(|error| error.at_line_number(statement.line_number()))?;
        block.append(code);
    }
    block.push(Command::Op(Opcode::Hlt));
    let commands = block.commands();
    validate(&commands, &gen.symbols)?;
    Ok(Listing {
        commands,
        symbols: gen.symbols,
    })
}

/// A fully generated program: the resolved command sequence plus the
/// variable addresses it was generated against.
#[derive(Debug)]
pub struct Listing {
    commands: Vec<Command>,
    symbols: SymbolTable,
}

impl Listing {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn image(&self) -> Result<Vec<i64>> {
        super::image(&self.commands)
    }
}

fn validate(commands: &[Command], symbols: &SymbolTable) -> Result<()> {
    let len = commands.len();
    for command in commands {
        match command {
            Command::Body | Command::After | Command::SkipOnce(_) => {
                return Err(error!(InternalError; "UNRESOLVED COMMAND"));
            }
            Command::Dynamic(target) if *target >= len => {
                return Err(error!(InternalError; "JUMP TARGET OUT OF RANGE"));
            }
            _ => {}
        }
    }
    if len > symbols.lowest().unwrap_or(MEMORY_SIZE) {
        return Err(error!(OutOfMemory));
    }
    Ok(())
}

struct Generator {
    symbols: SymbolTable,
    spills: Vec<Address>,
}

impl Generator {
    fn new(program: &[Statement]) -> Result<Generator> {
        let mut symbols = SymbolTable::new();
        let mut spills = Vec::new();
        for level in 0..spill_depth(program) {
            let name: Rc<str> = format!("@{}", level).into();
            spills.push(symbols.declare(name)?);
        }
        Ok(Generator { symbols, spills })
    }

    fn statement(&mut self, statement: &Statement) -> Result<Link> {
        match statement {
            Statement::Declare(_, name, len, init) => self.declare(name, *len, init.as_ref()),
            Statement::Assign(_, variable, op, expr) => self.assign(variable, *op, expr),
            Statement::Step(_, op, variable) => self.step(*op, variable, 0),
            Statement::While(_, condition, body) => {
                let condition = self.condition(condition, 0)?;
                let body = self.body(body)?;
                Ok(condition.looping(body))
            }
            Statement::If(_, condition, then_body, else_body) => {
                let condition = self.condition(condition, 0)?;
                let then_body = self.body(then_body)?;
                let else_body = self.body(else_body)?;
                Ok(condition.branching(then_body, else_body))
            }
            Statement::Output(_, expr) => {
                let mut block = self.expression(expr, 0)?;
                block.push(Command::Op(Opcode::Out));
                Ok(block)
            }
        }
    }

    fn body(&mut self, statements: &[Statement]) -> Result<Link> {
        let mut block = Link::new();
        for statement in statements {
            let code = self
                .statement(statement)
                .map_err(|error| error.at_line_number(statement.line_number()))?;
            block.append(code);
        }
        Ok(block)
    }

    fn declare(&mut self, name: &Rc<str>, len: Option<usize>, init: Option<&Expression>) -> Result<Link> {
        match (len, init) {
            (Some(len), None) => {
                debug_assert!(len > 0);
                self.symbols.declare_array(Rc::clone(name), len)?;
                Ok(Link::new())
            }
            (None, Some(init)) => {
                // The initializer is generated first so a name can't
                // appear in its own initializer.
                let mut block = self.expression(init, 0)?;
                let address = self.symbols.declare(Rc::clone(name))?;
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Variable(address));
                Ok(block)
            }
            (None, None) => {
                self.symbols.declare(Rc::clone(name))?;
                Ok(Link::new())
            }
            (Some(_), Some(_)) => Err(error!(InternalError)),
        }
    }

    fn assign(&mut self, variable: &Variable, op: AssignOp, expr: &Expression) -> Result<Link> {
        let value = match assign_operator(op) {
            None => expr.clone(),
            Some(op) => Expression::Binary(
                Box::new(Expression::Variable(variable.clone())),
                op,
                Box::new(expr.clone()),
            ),
        };
        match variable {
            Variable::Scalar(name) => {
                let mut block = self.expression(&value, 0)?;
                let address = self.symbols.address(name)?;
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Variable(address));
                Ok(block)
            }
            Variable::Element(name, index) => {
                if let Expression::Number(n) = index.as_ref() {
                    let address = self.element(name, *n)?;
                    let mut block = self.expression(&value, 0)?;
                    block.push(Command::Op(Opcode::Sta));
                    block.push(Command::Variable(address));
                    return Ok(block);
                }
                // Park the computed element address in the trailing
                // store's own operand slot, then evaluate the value.
                let mut block = self.element_address(name, index, 0)?;
                let prefix = block.len();
                let value = self.expression(&value, 0)?;
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Dynamic(prefix + 2 + value.len() + 1));
                block.append(value);
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Filled);
                Ok(block)
            }
        }
    }

    /// `++x` / `--x`. Leaves the updated value in the accumulator, which
    /// is what expression contexts want and harmless as a statement.
    fn step(&mut self, op: StepOp, variable: &Variable, level: usize) -> Result<Link> {
        let adjust = match op {
            StepOp::Up => Opcode::Addi,
            StepOp::Down => Opcode::Subi,
        };
        match variable {
            Variable::Scalar(name) => {
                let address = self.symbols.address(name)?;
                Ok(self.step_direct(adjust, address))
            }
            Variable::Element(name, index) => {
                if let Expression::Number(n) = index.as_ref() {
                    let address = self.element(name, *n)?;
                    return Ok(self.step_direct(adjust, address));
                }
                // The address is computed once but used twice, so it is
                // parked in both the load's and the store's operand slot.
                let mut block = self.element_address(name, index, level)?;
                let prefix = block.len();
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Dynamic(prefix + 5));
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Dynamic(prefix + 9));
                block.push(Command::Op(Opcode::Lda));
                block.push(Command::Filled);
                block.push(Command::Op(adjust));
                block.push(Command::Data(1));
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Filled);
                Ok(block)
            }
        }
    }

    fn step_direct(&self, adjust: Opcode, address: Address) -> Link {
        let mut block = Link::new();
        block.push(Command::Op(Opcode::Lda));
        block.push(Command::Variable(address));
        block.push(Command::Op(adjust));
        block.push(Command::Data(1));
        block.push(Command::Op(Opcode::Sta));
        block.push(Command::Variable(address));
        block
    }

    fn expression(&mut self, expr: &Expression, level: usize) -> Result<Link> {
        match expr {
            Expression::Number(n) => {
                let mut block = Link::new();
                block.push(Command::Op(Opcode::Ldi));
                block.push(Command::Data(*n));
                Ok(block)
            }
            Expression::Variable(variable) => self.load(variable, level),
            Expression::Binary(left, op, right) => {
                let (immediate, memory) = match op {
                    BinOp::Add => (Opcode::Addi, Opcode::Add),
                    BinOp::Subtract => (Opcode::Subi, Opcode::Sub),
                    BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
                        return Err(error!(UnsupportedOperator));
                    }
                };
                self.combine(left, immediate, memory, right, level)
            }
            Expression::Step(op, variable) => self.step(*op, variable, level),
        }
    }

    fn load(&mut self, variable: &Variable, level: usize) -> Result<Link> {
        match variable {
            Variable::Scalar(name) => {
                let address = self.symbols.address(name)?;
                let mut block = Link::new();
                block.push(Command::Op(Opcode::Lda));
                block.push(Command::Variable(address));
                Ok(block)
            }
            Variable::Element(name, index) => {
                if let Expression::Number(n) = index.as_ref() {
                    let address = self.element(name, *n)?;
                    let mut block = Link::new();
                    block.push(Command::Op(Opcode::Lda));
                    block.push(Command::Variable(address));
                    return Ok(block);
                }
                let mut block = self.element_address(name, index, level)?;
                let prefix = block.len();
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Dynamic(prefix + 3));
                block.push(Command::Op(Opcode::Lda));
                block.push(Command::Filled);
                Ok(block)
            }
        }
    }

    /// Code that leaves the absolute address of `name[index]` in the
    /// accumulator: the index value plus the array's base address.
    fn element_address(&mut self, name: &str, index: &Expression, level: usize) -> Result<Link> {
        let base = self.symbols.array(name)?[0];
        let mut block = self.expression(index, level)?;
        block.push(Command::Op(Opcode::Addi));
        block.push(Command::Data(base as i64));
        Ok(block)
    }

    fn element(&self, name: &str, index: i64) -> Result<Address> {
        let index = usize::try_from(index).map_err(|_| error!(SubscriptOutOfRange))?;
        self.symbols.element_address(name, index)
    }

    /// Left value combined with right operand through the accumulator.
    /// A simple right side is a direct operand of the combining
    /// instruction. A compound right side takes two spill cells: the
    /// left value is parked first so `++`/`--` effects happen in source
    /// order, then the right value, then both reload into the combine.
    fn combine(
        &mut self,
        left: &Expression,
        immediate: Opcode,
        memory: Opcode,
        right: &Expression,
        level: usize,
    ) -> Result<Link> {
        match right {
            Expression::Number(n) => {
                let mut block = self.expression(left, level)?;
                block.push(Command::Op(immediate));
                block.push(Command::Data(*n));
                Ok(block)
            }
            Expression::Variable(Variable::Scalar(name)) => {
                let address = self.symbols.address(name)?;
                let mut block = self.expression(left, level)?;
                block.push(Command::Op(memory));
                block.push(Command::Variable(address));
                Ok(block)
            }
            Expression::Variable(Variable::Element(name, index)) if constant(index) => {
                let address = match index.as_ref() {
                    Expression::Number(n) => self.element(name, *n)?,
                    _ => return Err(error!(InternalError)),
                };
                let mut block = self.expression(left, level)?;
                block.push(Command::Op(memory));
                block.push(Command::Variable(address));
                Ok(block)
            }
            _ => {
                let held = self.spill(level)?;
                let operand = self.spill(level + 1)?;
                let mut block = self.expression(left, level)?;
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Variable(held));
                block.append(self.expression(right, level + 1)?);
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Variable(operand));
                block.push(Command::Op(Opcode::Lda));
                block.push(Command::Variable(held));
                block.push(Command::Op(memory));
                block.push(Command::Variable(operand));
                Ok(block)
            }
        }
    }

    /// One comparison as a condition block. The flag-setting subtraction
    /// is directional, so `>` and `>=` subtract the operands the other
    /// way around and reuse the `<` and `<=` branch tails. When either
    /// operand can carry a `++`/`--` effect the left side still runs
    /// first, parked in a spill cell for the reversed subtraction.
    fn compare(&mut self, left: &Expression, op: CmpOp, right: &Expression, level: usize) -> Result<Link> {
        let mut block = match op {
            CmpOp::Greater | CmpOp::GreaterEqual if is_simple(left) && is_simple(right) => {
                self.combine(right, Opcode::Subi, Opcode::Sub, left, level)?
            }
            CmpOp::Greater | CmpOp::GreaterEqual => {
                let held = self.spill(level)?;
                let mut block = self.expression(left, level)?;
                block.push(Command::Op(Opcode::Sta));
                block.push(Command::Variable(held));
                block.append(self.expression(right, level + 1)?);
                block.push(Command::Op(Opcode::Sub));
                block.push(Command::Variable(held));
                block
            }
            _ => self.combine(left, Opcode::Subi, Opcode::Sub, right, level)?,
        };
        match op {
            // Carry set means no borrow, i.e. x >= y.
            CmpOp::Less | CmpOp::Greater => {
                block.push(Command::Op(Opcode::Jc));
                block.push(Command::After);
            }
            CmpOp::NotEqual => {
                block.push(Command::Op(Opcode::Jz));
                block.push(Command::After);
            }
            CmpOp::Equal => {
                block.push(Command::Op(Opcode::Jz));
                block.push(Command::Body);
                block.push(Command::Op(Opcode::Jmp));
                block.push(Command::After);
            }
            CmpOp::LessEqual | CmpOp::GreaterEqual => {
                block.push(Command::Op(Opcode::Jz));
                block.push(Command::Body);
                block.push(Command::Op(Opcode::Jc));
                block.push(Command::After);
            }
        }
        Ok(block)
    }

    fn condition(&mut self, condition: &Condition, level: usize) -> Result<Link> {
        match condition {
            Condition::Compare(left, op, right) => self.compare(left, *op, right, level),
            Condition::Both(a, b) => Ok(self.condition(a, level)?.and(self.condition(b, level)?)),
            Condition::Either(a, b) => Ok(self.condition(a, level)?.or(self.condition(b, level)?)),
            Condition::Not(inner) => Ok(self.condition(inner, level)?.negate()),
        }
    }

    fn spill(&self, level: usize) -> Result<Address> {
        match self.spills.get(level) {
            Some(address) => Ok(*address),
            None => Err(error!(InternalError; "SPILL POOL EXHAUSTED")),
        }
    }
}

fn assign_operator(op: AssignOp) -> Option<BinOp> {
    match op {
        AssignOp::Set => None,
        AssignOp::Add => Some(BinOp::Add),
        AssignOp::Subtract => Some(BinOp::Subtract),
        AssignOp::Multiply => Some(BinOp::Multiply),
        AssignOp::Divide => Some(BinOp::Divide),
        AssignOp::Modulo => Some(BinOp::Modulo),
    }
}

fn constant(expr: &Expression) -> bool {
    match expr {
        Expression::Number(_) => true,
        _ => false,
    }
}

// Spill pool sizing. A compound right operand makes combine() hold the
// left value in one cell while the right side evaluates one level
// deeper, then park the right value in a second cell for the reload.

fn spill_depth(statements: &[Statement]) -> usize {
    statements.iter().map(cells_statement).max().unwrap_or(0)
}

fn cells_statement(statement: &Statement) -> usize {
    match statement {
        Statement::Declare(_, _, _, init) => init.as_ref().map(cells_expression).unwrap_or(0),
        Statement::Assign(_, variable, op, expr) => {
            let write = cells_variable(variable);
            let value = match assign_operator(*op) {
                None => cells_expression(expr),
                Some(_) => {
                    let target = Expression::Variable(variable.clone());
                    cells_pair(&target, expr)
                }
            };
            write.max(value)
        }
        Statement::Step(_, _, variable) => cells_variable(variable),
        Statement::While(_, condition, body) => {
            cells_condition(condition).max(spill_depth(body))
        }
        Statement::If(_, condition, then_body, else_body) => cells_condition(condition)
            .max(spill_depth(then_body))
            .max(spill_depth(else_body)),
        Statement::Output(_, expr) => cells_expression(expr),
    }
}

fn cells_condition(condition: &Condition) -> usize {
    match condition {
        // Mirrors the reversed subtraction in compare().
        Condition::Compare(left, op, right) => match op {
            CmpOp::Greater | CmpOp::GreaterEqual => {
                if is_simple(left) && is_simple(right) {
                    0
                } else {
                    cells_expression(left).max(cells_expression(right) + 1)
                }
            }
            _ => cells_pair(left, right),
        },
        Condition::Both(a, b) | Condition::Either(a, b) => {
            cells_condition(a).max(cells_condition(b))
        }
        Condition::Not(inner) => cells_condition(inner),
    }
}

fn cells_expression(expr: &Expression) -> usize {
    match expr {
        Expression::Number(_) => 0,
        Expression::Variable(variable) => cells_variable(variable),
        Expression::Binary(left, _, right) => cells_pair(left, right),
        Expression::Step(_, variable) => cells_variable(variable),
    }
}

fn cells_pair(left: &Expression, right: &Expression) -> usize {
    if is_simple(right) {
        cells_expression(left)
    } else {
        cells_expression(left)
            .max(cells_expression(right) + 1)
            .max(2)
    }
}

fn cells_variable(variable: &Variable) -> usize {
    match variable {
        Variable::Scalar(_) => 0,
        Variable::Element(_, index) => cells_expression(index),
    }
}

fn is_simple(expr: &Expression) -> bool {
    match expr {
        Expression::Number(_) => true,
        Expression::Variable(Variable::Scalar(_)) => true,
        Expression::Variable(Variable::Element(_, index)) => constant(index),
        _ => false,
    }
}
