use super::LineNumber;

pub struct Error {
    code: u16,
    line_number: Option<LineNumber>,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            line_number: None,
            message: "",
        }
    }

    pub fn in_line_number(&self, line: LineNumber) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            code: self.code,
            line_number: Some(line),
            message: self.message,
        }
    }

    /// Tags the error with a line number if it doesn't carry one yet.
    /// Statement boundaries use this so expression errors report the
    /// statement's line.
    pub fn at_line_number(self, line: LineNumber) -> Error {
        Error {
            code: self.code,
            line_number: self.line_number.or(Some(line)),
            message: self.message,
        }
    }

    pub fn message(&self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            line_number: self.line_number,
            message,
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }
}

pub enum ErrorCode {
    SyntaxError = 1,
    UnknownCharacter = 2,
    DuplicateDeclaration = 3,
    UndeclaredVariable = 4,
    UnsupportedOperator = 5,
    SubscriptOutOfRange = 6,
    DivisionByZero = 7,
    OutOfMemory = 8,
    Break = 9,
    FileNotFound = 10,
    InternalError = 51,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = match self.code {
            1 => "SYNTAX ERROR",
            2 => "UNKNOWN CHARACTER",
            3 => "DUPLICATE DECLARATION",
            4 => "UNDECLARED VARIABLE",
            5 => "UNSUPPORTED OPERATOR",
            6 => "SUBSCRIPT OUT OF RANGE",
            7 => "DIVISION BY ZERO",
            8 => "OUT OF MEMORY",
            9 => "BREAK",
            10 => "FILE NOT FOUND",
            51 => "INTERNAL ERROR",
            _ => "",
        };
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" IN LINE {}", line_number));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if code_str.is_empty() {
            write!(f, "PROGRAM ERROR {}{}", self.code, suffix)
        } else {
            write!(f, "{}{}", code_str, suffix)
        }
    }
}
