/*!
# Language Module

Lexical analysis and parsing of the ACC language.

*/

#[macro_use]
mod error;
mod lex;
mod parse;
mod token;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::lex;
pub use parse::parse;
pub use token::{Operator, Token, Word};

pub mod ast;

/// Source line numbers start at 1.
pub type LineNumber = usize;
