use super::{Address, MEMORY_TOP};
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Variable-to-address assignments for one program.
///
/// Scalars take one cell, arrays one cell per element. The allocation
/// cursor starts at the top of memory and descends, so the first
/// declaration lands at 255. An array occupies a contiguous block whose
/// elements ascend from the block's lowest cell; element zero is the
/// lowest address, keeping subscript arithmetic a single addition.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: HashMap<Rc<str>, Symbol>,
    order: Vec<Rc<str>>,
    cursor: Address,
    exhausted: bool,
}

#[derive(Debug)]
enum Symbol {
    Scalar(Address),
    Array(Vec<Address>),
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            symbols: HashMap::new(),
            order: Vec::new(),
            cursor: MEMORY_TOP,
            exhausted: false,
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Lowest cell any variable occupies; the program image must end
    /// below it. `None` while the table is empty.
    pub fn lowest(&self) -> Option<Address> {
        if self.order.is_empty() {
            None
        } else if self.exhausted {
            Some(0)
        } else {
            Some(self.cursor + 1)
        }
    }

    pub fn declare(&mut self, name: Rc<str>) -> Result<Address> {
        self.check_duplicate(&name)?;
        let address = self.take(1)?;
        self.order.push(Rc::clone(&name));
        self.symbols.insert(name, Symbol::Scalar(address));
        Ok(address)
    }

    pub fn declare_array(&mut self, name: Rc<str>, len: usize) -> Result<Address> {
        debug_assert!(len > 0);
        self.check_duplicate(&name)?;
        let base = self.take(len)?;
        let cells: Vec<Address> = (base..base + len).collect();
        self.order.push(Rc::clone(&name));
        self.symbols.insert(name, Symbol::Array(cells));
        Ok(base)
    }

    /// Address of a scalar, or of one element of an array when a
    /// constant subscript is known at generation time.
    pub fn address(&self, name: &str) -> Result<Address> {
        match self.symbols.get(name) {
            Some(Symbol::Scalar(address)) => Ok(*address),
            Some(Symbol::Array(_)) => Err(error!(SyntaxError; "EXPECTED SUBSCRIPT")),
            None => Err(error!(UndeclaredVariable)),
        }
    }

    pub fn element_address(&self, name: &str, index: usize) -> Result<Address> {
        match self.symbols.get(name) {
            Some(Symbol::Array(cells)) => match cells.get(index) {
                Some(address) => Ok(*address),
                None => Err(error!(SubscriptOutOfRange)),
            },
            Some(Symbol::Scalar(_)) => Err(error!(SyntaxError; "UNEXPECTED SUBSCRIPT")),
            None => Err(error!(UndeclaredVariable)),
        }
    }

    pub fn array(&self, name: &str) -> Result<&[Address]> {
        match self.symbols.get(name) {
            Some(Symbol::Array(cells)) => Ok(cells),
            Some(Symbol::Scalar(_)) => Err(error!(SyntaxError; "UNEXPECTED SUBSCRIPT")),
            None => Err(error!(UndeclaredVariable)),
        }
    }

    /// Declaration-order listing of every symbol and its cells, for the
    /// memory map printed after compilation.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Address])> {
        self.order.iter().map(move |name| {
            let cells: &[Address] = match &self.symbols[name] {
                Symbol::Scalar(address) => std::slice::from_ref(address),
                Symbol::Array(cells) => cells,
            };
            (&**name, cells)
        })
    }

    fn check_duplicate(&self, name: &str) -> Result<()> {
        if self.is_declared(name) {
            return Err(error!(DuplicateDeclaration));
        }
        Ok(())
    }

    fn take(&mut self, len: usize) -> Result<Address> {
        if self.exhausted || len > self.cursor + 1 {
            return Err(error!(OutOfMemory));
        }
        let base = self.cursor + 1 - len;
        match base.checked_sub(1) {
            Some(next) => self.cursor = next,
            None => self.exhausted = true,
        }
        Ok(base)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
