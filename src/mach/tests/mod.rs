use super::{codegen, Interpreter, Listing, Runtime};
use crate::lang;

mod interp_test;

fn listing(source: &str) -> Listing {
    let tokens = lang::lex(source).expect("lex");
    let program = lang::parse(&tokens).expect("parse");
    codegen(&program).expect("codegen")
}

fn generate(source: &str) -> Result<Listing, lang::Error> {
    let tokens = lang::lex(source).expect("lex");
    let program = lang::parse(&tokens).expect("parse");
    codegen(&program)
}

/// Compiles and runs on the emulator, returning the outputs.
fn run(source: &str) -> Vec<i64> {
    let image = listing(source).image().expect("image");
    let mut runtime = Runtime::load(&image).expect("load");
    let halted = runtime.run(100_000).expect("execute");
    assert!(halted, "execution cycles exceeded");
    runtime.outputs().to_vec()
}

fn interpret(source: &str) -> Vec<i64> {
    let tokens = lang::lex(source).expect("lex");
    let program = lang::parse(&tokens).expect("parse");
    Interpreter::new().run(&program).expect("interpret")
}
