/*!
# Interactive session

Line-at-a-time interface over the tree-walking interpreter. Variables
persist for the life of the session, so programs can be built up
incrementally. Ctrl-C stops a running loop without leaving the session.
*/

extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;

use crate::lang;
use crate::mach::Interpreter;
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Signal};
use std::io::Write;
use std::sync::atomic::Ordering;

pub fn main() {
    if let Err(error) = main_loop() {
        eprintln!("{}", error);
    }
}

fn main_loop() -> std::io::Result<()> {
    let mut interpreter = Interpreter::new();
    let interrupted = interpreter.interrupted();
    ctrlc::set_handler(move || {
        interrupted.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let command = Interface::new("ACC")?;
    command.set_prompt("acc> ")?;
    command.set_report_signal(Signal::Interrupt, true);

    loop {
        let string = match command.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(Signal::Interrupt) => continue,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        if string.trim().is_empty() {
            continue;
        }
        match enter(&mut interpreter, &string) {
            Ok(outputs) => {
                for value in outputs {
                    command.write_fmt(format_args!("{}\n", value))?;
                }
                command.add_history_unique(string);
            }
            Err(error) => {
                command.write_fmt(format_args!(
                    "{}\n",
                    Style::new().bold().paint(error.to_string())
                ))?;
            }
        }
    }
    Ok(())
}

fn enter(interpreter: &mut Interpreter, string: &str) -> Result<Vec<i64>, lang::Error> {
    let tokens = lang::lex(string)?;
    let program = lang::parse(&tokens)?;
    interpreter.run(&program)
}
