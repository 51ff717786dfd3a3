//! # ACCI
//!
//! Interactive interpreter for the ACC language.

fn main() {
    acc::term::main();
}
