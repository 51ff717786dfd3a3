//! # ACCC
//!
//! Compiler for the ACC language. Reads a source file, generates a
//! program image for the accumulator machine, and writes one word per
//! line to `out.txt` along with a memory map of the variables.

use acc::error;
use acc::lang::{self, Error};
use acc::mach;
use ansi_term::Style;
use std::fs;
use std::process::exit;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "test.txt".to_string());
    match compile(&path) {
        Ok(report) => print!("{}", report),
        Err(error) => {
            eprintln!("{}", Style::new().bold().paint(error.to_string()));
            exit(1);
        }
    }
}

fn compile(path: &str) -> Result<String, Error> {
    let source = fs::read_to_string(path).map_err(|_| error!(FileNotFound))?;
    let tokens = lang::lex(&source)?;
    let program = lang::parse(&tokens)?;
    let listing = mach::codegen(&program)?;
    let image = listing.image()?;

    let mut dump = String::new();
    for word in &image {
        dump.push_str(&format!("{}\n", word));
    }
    fs::write("out.txt", dump).map_err(|_| error!(FileNotFound; "CANNOT WRITE OUT.TXT"))?;

    let mut report = format!("{} words written to out.txt\n", image.len());
    for (name, cells) in listing.symbols().iter() {
        match cells {
            [cell] => report.push_str(&format!("{} @ {}\n", name, cell)),
            _ => report.push_str(&format!(
                "{} @ {}..{}\n",
                name,
                cells[0],
                cells[cells.len() - 1]
            )),
        }
    }
    Ok(report)
}
