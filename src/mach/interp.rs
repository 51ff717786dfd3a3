use crate::error;
use crate::lang::ast::{
    AssignOp, BinOp, CmpOp, Condition, Expression, Statement, StepOp, Variable,
};
use crate::lang::Error;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// ## Tree-walking interpreter
///
/// Executes the syntax tree directly, without generating machine code.
/// Unlike the generator it supports multiplication, division, and
/// modulus, with truncating integer semantics; division by zero is a
/// fatal runtime error. Variables persist across `run` calls so an
/// interactive session can build up state line by line.
pub struct Interpreter {
    variables: HashMap<Rc<str>, Value>,
    interrupted: Arc<AtomicBool>,
}

enum Value {
    Scalar(i64),
    Array(Vec<i64>),
}

impl Interpreter {
    pub fn new() -> Interpreter {
        Interpreter {
            variables: HashMap::new(),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag a signal handler can set to stop a running loop.
    pub fn interrupted(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn run(&mut self, program: &[Statement]) -> Result<Vec<i64>> {
        self.interrupted.store(false, Ordering::SeqCst);
        let mut outputs = Vec::new();
        self.block(program, &mut outputs)?;
        Ok(outputs)
    }

    fn block(&mut self, statements: &[Statement], outputs: &mut Vec<i64>) -> Result<()> {
        for statement in statements {
            self.statement(statement, outputs)
                .map_err(|error| error.at_line_number(statement.line_number()))?;
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement, outputs: &mut Vec<i64>) -> Result<()> {
        match statement {
            Statement::Declare(_, name, len, init) => self.declare(name, *len, init.as_ref()),
            Statement::Assign(_, variable, op, expr) => {
                let op = match op {
                    AssignOp::Set => None,
                    AssignOp::Add => Some(BinOp::Add),
                    AssignOp::Subtract => Some(BinOp::Subtract),
                    AssignOp::Multiply => Some(BinOp::Multiply),
                    AssignOp::Divide => Some(BinOp::Divide),
                    AssignOp::Modulo => Some(BinOp::Modulo),
                };
                let value = match op {
                    None => self.expression(expr)?,
                    Some(op) => {
                        let current = self.read(variable)?;
                        let operand = self.expression(expr)?;
                        self.arithmetic(current, op, operand)?
                    }
                };
                self.store(variable, value)
            }
            Statement::Step(_, op, variable) => {
                self.step(*op, variable)?;
                Ok(())
            }
            Statement::While(_, condition, body) => {
                while self.condition(condition)? {
                    if self.interrupted.load(Ordering::SeqCst) {
                        return Err(error!(Break));
                    }
                    self.block(body, outputs)?;
                }
                Ok(())
            }
            Statement::If(_, condition, then_body, else_body) => {
                if self.condition(condition)? {
                    self.block(then_body, outputs)
                } else {
                    self.block(else_body, outputs)
                }
            }
            Statement::Output(_, expr) => {
                let value = self.expression(expr)?;
                outputs.push(value);
                Ok(())
            }
        }
    }

    fn declare(&mut self, name: &Rc<str>, len: Option<usize>, init: Option<&Expression>) -> Result<()> {
        if self.variables.contains_key(&**name) {
            return Err(error!(DuplicateDeclaration));
        }
        let value = match (len, init) {
            (Some(len), None) => Value::Array(vec![0; len]),
            (None, Some(init)) => Value::Scalar(self.expression(init)?),
            (None, None) => Value::Scalar(0),
            (Some(_), Some(_)) => return Err(error!(InternalError)),
        };
        self.variables.insert(Rc::clone(name), value);
        Ok(())
    }

    fn step(&mut self, op: StepOp, variable: &Variable) -> Result<i64> {
        let value = match op {
            StepOp::Up => self.read(variable)?.wrapping_add(1),
            StepOp::Down => self.read(variable)?.wrapping_sub(1),
        };
        self.store(variable, value)?;
        Ok(value)
    }

    fn expression(&mut self, expr: &Expression) -> Result<i64> {
        match expr {
            Expression::Number(n) => Ok(*n),
            Expression::Variable(variable) => self.read(variable),
            Expression::Binary(left, op, right) => {
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                self.arithmetic(left, *op, right)
            }
            Expression::Step(op, variable) => self.step(*op, variable),
        }
    }

    fn arithmetic(&self, left: i64, op: BinOp, right: i64) -> Result<i64> {
        match op {
            BinOp::Add => Ok(left.wrapping_add(right)),
            BinOp::Subtract => Ok(left.wrapping_sub(right)),
            BinOp::Multiply => Ok(left.wrapping_mul(right)),
            BinOp::Divide => {
                if right == 0 {
                    return Err(error!(DivisionByZero));
                }
                Ok(left.wrapping_div(right))
            }
            BinOp::Modulo => {
                if right == 0 {
                    return Err(error!(DivisionByZero));
                }
                Ok(left.wrapping_rem(right))
            }
        }
    }

    fn condition(&mut self, condition: &Condition) -> Result<bool> {
        match condition {
            Condition::Compare(left, op, right) => {
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                Ok(match op {
                    CmpOp::Equal => left == right,
                    CmpOp::NotEqual => left != right,
                    CmpOp::Less => left < right,
                    CmpOp::LessEqual => left <= right,
                    CmpOp::Greater => left > right,
                    CmpOp::GreaterEqual => left >= right,
                })
            }
            Condition::Both(a, b) => Ok(self.condition(a)? && self.condition(b)?),
            Condition::Either(a, b) => Ok(self.condition(a)? || self.condition(b)?),
            Condition::Not(inner) => Ok(!self.condition(inner)?),
        }
    }

    fn read(&mut self, variable: &Variable) -> Result<i64> {
        match variable {
            Variable::Scalar(name) => match self.variables.get(&**name) {
                Some(Value::Scalar(value)) => Ok(*value),
                Some(Value::Array(_)) => Err(error!(SyntaxError; "EXPECTED SUBSCRIPT")),
                None => Err(error!(UndeclaredVariable)),
            },
            Variable::Element(name, index) => {
                let index = self.index(index)?;
                match self.variables.get(&**name) {
                    Some(Value::Array(values)) => match values.get(index) {
                        Some(value) => Ok(*value),
                        None => Err(error!(SubscriptOutOfRange)),
                    },
                    Some(Value::Scalar(_)) => Err(error!(SyntaxError; "UNEXPECTED SUBSCRIPT")),
                    None => Err(error!(UndeclaredVariable)),
                }
            }
        }
    }

    fn store(&mut self, variable: &Variable, value: i64) -> Result<()> {
        match variable {
            Variable::Scalar(name) => match self.variables.get_mut(&**name) {
                Some(Value::Scalar(slot)) => {
                    *slot = value;
                    Ok(())
                }
                Some(Value::Array(_)) => Err(error!(SyntaxError; "EXPECTED SUBSCRIPT")),
                None => Err(error!(UndeclaredVariable)),
            },
            Variable::Element(name, index) => {
                let index = self.index(index)?;
                match self.variables.get_mut(&**name) {
                    Some(Value::Array(values)) => match values.get_mut(index) {
                        Some(slot) => {
                            *slot = value;
                            Ok(())
                        }
                        None => Err(error!(SubscriptOutOfRange)),
                    },
                    Some(Value::Scalar(_)) => Err(error!(SyntaxError; "UNEXPECTED SUBSCRIPT")),
                    None => Err(error!(UndeclaredVariable)),
                }
            }
        }
    }

    fn index(&mut self, index: &Expression) -> Result<usize> {
        let value = self.expression(index)?;
        if value < 0 {
            return Err(error!(SubscriptOutOfRange));
        }
        Ok(value as usize)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
