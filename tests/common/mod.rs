use acc::lang;
use acc::mach::{codegen, Interpreter, Listing, Runtime};

pub fn compile(source: &str) -> Result<Listing, lang::Error> {
    let tokens = lang::lex(source)?;
    let program = lang::parse(&tokens)?;
    codegen(&program)
}

/// Compiles and runs on the emulator. Outputs arrive one per line;
/// errors and a blown cycle budget are reported in the same stream.
pub fn exec(source: &str) -> String {
    exec_n(source, 100_000)
}

pub fn exec_n(source: &str, cycles: usize) -> String {
    let image = match compile(source).and_then(|listing| listing.image()) {
        Ok(image) => image,
        Err(error) => return format!("{}\n", error),
    };
    let mut runtime = match Runtime::load(&image) {
        Ok(runtime) => runtime,
        Err(error) => return format!("{}\n", error),
    };
    let mut s = String::new();
    match runtime.run(cycles) {
        Err(error) => s.push_str(&format!("{}\n", error)),
        Ok(halted) => {
            for value in runtime.outputs() {
                s.push_str(&format!("{}\n", value));
            }
            if !halted {
                s.push_str(&format!("{} execution cycles exceeded\n", cycles));
            }
        }
    }
    s
}

/// Same program under the tree-walking interpreter.
pub fn interp(source: &str) -> String {
    let result = lang::lex(source)
        .and_then(|tokens| lang::parse(&tokens))
        .and_then(|program| Interpreter::new().run(&program));
    match result {
        Ok(outputs) => outputs.iter().map(|value| format!("{}\n", value)).collect(),
        Err(error) => format!("{}\n", error),
    }
}
