use super::Address;
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Machine instruction set
///
/// The target is a von Neumann machine: one 256-word memory holding both
/// the program (loaded at 0) and the variables (allocated from 255 down),
/// a single accumulator, and two flags. Opcode and operand are separate
/// words, so a jump target is simply an index into the command sequence.
///
/// There is no indirect addressing. A runtime-computed address is written
/// by the program itself into the operand word of an upcoming instruction
/// before that instruction executes.
#[derive(Clone, Copy, PartialEq)]
pub enum Opcode {
    /// Stop execution.
    Hlt,
    /// Load immediate into the accumulator.
    Ldi,
    /// Load from memory.
    Lda,
    /// Store the accumulator to memory.
    Sta,
    /// Add immediate. Sets the zero flag, clears carry.
    Addi,
    /// Add from memory.
    Add,
    /// Subtract immediate. Sets the zero flag; carry means "no borrow".
    Subi,
    /// Subtract from memory.
    Sub,
    /// Unconditional branch.
    Jmp,
    /// Branch if the zero flag is set.
    Jz,
    /// Branch if the carry flag is set.
    Jc,
    /// Emit the accumulator as one line of output.
    Out,
}

impl Opcode {
    pub fn code(self) -> i64 {
        use Opcode::*;
        match self {
            Hlt => 0,
            Ldi => 1,
            Lda => 2,
            Sta => 3,
            Addi => 4,
            Add => 5,
            Subi => 6,
            Sub => 7,
            Jmp => 8,
            Jz => 9,
            Jc => 10,
            Out => 11,
        }
    }

    pub fn from_code(code: i64) -> Option<Opcode> {
        use Opcode::*;
        Some(match code {
            0 => Hlt,
            1 => Ldi,
            2 => Lda,
            3 => Sta,
            4 => Addi,
            5 => Add,
            6 => Subi,
            7 => Sub,
            8 => Jmp,
            9 => Jz,
            10 => Jc,
            11 => Out,
            _ => return None,
        })
    }

    /// Whether an operand word follows.
    pub fn has_operand(self) -> bool {
        use Opcode::*;
        match self {
            Hlt | Out => false,
            _ => true,
        }
    }
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Hlt => write!(f, "HLT"),
            Ldi => write!(f, "LDI"),
            Lda => write!(f, "LDA"),
            Sta => write!(f, "STA"),
            Addi => write!(f, "ADDI"),
            Add => write!(f, "ADD"),
            Subi => write!(f, "SUBI"),
            Sub => write!(f, "SUB"),
            Jmp => write!(f, "JMP"),
            Jz => write!(f, "JZ"),
            Jc => write!(f, "JC"),
            Out => write!(f, "OUT"),
        }
    }
}

/// ## Tagged command
///
/// One word of generated output, tagged with how its final numeric value
/// is computed. Sub-trees are generated bottom-up into independent blocks;
/// the tags are what keep jump targets correct while those blocks are
/// concatenated (see `Link`).
#[derive(Clone, Copy, PartialEq)]
pub enum Command {
    /// An opcode. Final.
    Op(Opcode),
    /// An immediate operand. Final.
    Data(i64),
    /// A resolved memory cell operand. Final.
    Variable(Address),
    /// A branch target relative to the start of the block under assembly.
    /// Grows by the length of everything prepended ahead of it, so it is
    /// absolute once the block reaches the driver.
    Dynamic(Address),
    /// Placeholder: branch to the first command after the enclosing
    /// construct's condition block.
    Body,
    /// Placeholder: branch to the first command after the whole construct.
    After,
    /// Placeholder used by `&&`/`||` lowering: branch over the other half
    /// of a combined condition. Block-relative, shifted like `Dynamic`.
    SkipOnce(Address),
    /// An operand slot the running program writes before use. Never
    /// patched at compile time.
    Filled,
}

impl Command {
    /// True when no later concatenation step needs to touch this word.
    pub fn is_resolved(self) -> bool {
        use Command::*;
        match self {
            Op(_) | Data(_) | Variable(_) | Dynamic(_) | Filled => true,
            Body | After | SkipOnce(_) => false,
        }
    }

    /// The numeric word for the program image, or None while unresolved.
    pub fn word(self) -> Option<i64> {
        use Command::*;
        match self {
            Op(op) => Some(op.code()),
            Data(n) => Some(n),
            Variable(addr) => Some(addr as i64),
            Dynamic(target) => Some(target as i64),
            Filled => Some(0),
            Body | After | SkipOnce(_) => None,
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Command::*;
        match self {
            Op(op) => write!(f, "{}", op),
            Data(n) => write!(f, "#{}", n),
            Variable(addr) => write!(f, "@{}", addr),
            Dynamic(target) => write!(f, "->{}", target),
            Body => write!(f, "->BODY"),
            After => write!(f, "->AFTER"),
            SkipOnce(target) => write!(f, "->SKIP({})", target),
            Filled => write!(f, "<slot>"),
        }
    }
}

/// The loadable program image: every command's numeric word, in order.
/// Fails if any command is still unresolved, which the driver rules out.
pub fn image(commands: &[Command]) -> Result<Vec<i64>> {
    commands
        .iter()
        .map(|command| match command.word() {
            Some(word) => Ok(word),
            None => Err(error!(InternalError; "UNRESOLVED COMMAND")),
        })
        .collect()
}
