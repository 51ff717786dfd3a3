use super::{Address, Opcode, MEMORY_SIZE};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Machine emulator
///
/// 256 words of memory, one accumulator, a zero flag and a carry flag.
/// The program image loads at address zero; everything above it starts
/// as zero, which is also every variable's initial value. Stores may
/// land inside the program area: that is how generated code performs
/// dynamic array subscripting, by writing a computed address into a
/// later instruction's operand word before executing it.
///
/// The carry flag follows the no-borrow convention: subtraction sets
/// it when the accumulator is greater than or equal to the operand.
pub struct Runtime {
    memory: [i64; MEMORY_SIZE],
    acc: i64,
    pc: Address,
    zero: bool,
    carry: bool,
    halted: bool,
    outputs: Vec<i64>,
}

impl Runtime {
    pub fn load(image: &[i64]) -> Result<Runtime> {
        if image.len() > MEMORY_SIZE {
            return Err(error!(OutOfMemory));
        }
        let mut memory = [0; MEMORY_SIZE];
        memory[..image.len()].copy_from_slice(image);
        Ok(Runtime {
            memory,
            acc: 0,
            pc: 0,
            zero: false,
            carry: false,
            halted: false,
            outputs: Vec::new(),
        })
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    /// Runs at most `limit` instructions. Returns true once the program
    /// halts; false means the budget ran out first.
    pub fn run(&mut self, limit: usize) -> Result<bool> {
        for _ in 0..limit {
            if self.halted {
                break;
            }
            self.step()?;
        }
        Ok(self.halted)
    }

    pub fn step(&mut self) -> Result<()> {
        if self.halted {
            return Ok(());
        }
        let opcode = match Opcode::from_code(self.fetch()?) {
            Some(opcode) => opcode,
            None => return Err(error!(InternalError; "INVALID OPCODE")),
        };
        match opcode {
            Opcode::Hlt => self.halted = true,
            Opcode::Ldi => self.acc = self.fetch()?,
            Opcode::Lda => {
                let address = self.operand_address()?;
                self.acc = self.memory[address];
            }
            Opcode::Sta => {
                let address = self.operand_address()?;
                self.memory[address] = self.acc;
            }
            Opcode::Addi => {
                let operand = self.fetch()?;
                self.add(operand);
            }
            Opcode::Add => {
                let address = self.operand_address()?;
                self.add(self.memory[address]);
            }
            Opcode::Subi => {
                let operand = self.fetch()?;
                self.subtract(operand);
            }
            Opcode::Sub => {
                let address = self.operand_address()?;
                self.subtract(self.memory[address]);
            }
            Opcode::Jmp => {
                let target = self.operand_address()?;
                self.pc = target;
            }
            Opcode::Jz => {
                let target = self.operand_address()?;
                if self.zero {
                    self.pc = target;
                }
            }
            Opcode::Jc => {
                let target = self.operand_address()?;
                if self.carry {
                    self.pc = target;
                }
            }
            Opcode::Out => self.outputs.push(self.acc),
        }
        Ok(())
    }

    fn fetch(&mut self) -> Result<i64> {
        if self.pc >= MEMORY_SIZE {
            return Err(error!(InternalError; "PROGRAM RAN OFF MEMORY"));
        }
        let word = self.memory[self.pc];
        self.pc += 1;
        Ok(word)
    }

    fn operand_address(&mut self) -> Result<Address> {
        let word = self.fetch()?;
        match usize::try_from(word) {
            Ok(address) if address < MEMORY_SIZE => Ok(address),
            _ => Err(error!(InternalError; "INVALID ADDRESS")),
        }
    }

    fn add(&mut self, operand: i64) {
        self.acc = self.acc.wrapping_add(operand);
        self.zero = self.acc == 0;
        self.carry = false;
    }

    fn subtract(&mut self, operand: i64) {
        self.carry = self.acc >= operand;
        self.acc = self.acc.wrapping_sub(operand);
        self.zero = self.acc == 0;
    }
}
