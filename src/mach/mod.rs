/*!
# Machine for the ACC language

A single-accumulator machine with 256 words of memory. Programs load at
address zero; variables are allocated from the top of memory down. The
code generator lowers an abstract syntax tree to a flat word image and
the runtime executes that image, including the self-modifying operand
stores used for dynamic array subscripts.
*/

mod codegen;
mod command;
mod interp;
mod link;
mod runtime;
mod symbol;

#[cfg(test)]
mod tests;

pub use codegen::{codegen, Listing};
pub use command::{image, Command, Opcode};
pub use interp::Interpreter;
pub use link::Link;
pub use runtime::Runtime;
pub use symbol::SymbolTable;

/// A memory cell index. The machine addresses 256 words.
pub type Address = usize;

/// Words of addressable memory.
pub const MEMORY_SIZE: Address = 256;

/// Highest memory cell; variable allocation starts here and descends.
pub const MEMORY_TOP: Address = MEMORY_SIZE - 1;
