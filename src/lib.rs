//! # ACC
//!
//! A tiny imperative language for a 256-word single-accumulator machine.
//!
//! The `accc` binary compiles a source file into a loadable program image,
//! one numeric word per line. The `acci` binary runs an interactive
//! interpreter session over the same language.
//!
//! ```text
//! declare i = 0;
//! while (i < 3) {
//!     output i;
//!     i += 1;
//! }
//! ```

pub mod lang;
pub mod mach;
pub mod term;
