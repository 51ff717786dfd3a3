use super::LineNumber;
use std::rc::Rc;

#[derive(Debug, PartialEq)]
pub enum Statement {
    /// `declare NAME;` `declare NAME[LEN];` `declare NAME = EXPR;`
    Declare(LineNumber, Rc<str>, Option<usize>, Option<Expression>),
    Assign(LineNumber, Variable, AssignOp, Expression),
    /// `++x;` and `--x;` as whole statements.
    Step(LineNumber, StepOp, Variable),
    While(LineNumber, Condition, Vec<Statement>),
    If(LineNumber, Condition, Vec<Statement>, Vec<Statement>),
    Output(LineNumber, Expression),
}

impl Statement {
    pub fn line_number(&self) -> LineNumber {
        use Statement::*;
        match self {
            Declare(line, ..) | Assign(line, ..) | Step(line, ..) | While(line, ..)
            | If(line, ..) | Output(line, ..) => *line,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Variable {
    Scalar(Rc<str>),
    Element(Rc<str>, Box<Expression>),
}

impl Variable {
    pub fn name(&self) -> &Rc<str> {
        match self {
            Variable::Scalar(name) => name,
            Variable::Element(name, _) => name,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Number(i64),
    Variable(Variable),
    Binary(Box<Expression>, BinOp, Box<Expression>),
    /// Pre-increment/decrement used inside an expression; yields the
    /// updated value.
    Step(StepOp, Variable),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AssignOp {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum StepOp {
    Up,
    Down,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CmpOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, PartialEq)]
pub enum Condition {
    Compare(Box<Expression>, CmpOp, Box<Expression>),
    /// `&&`
    Both(Box<Condition>, Box<Condition>),
    /// `||`
    Either(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}
