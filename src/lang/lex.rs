use super::{token::*, Error, LineNumber};

type Result<T> = std::result::Result<T, Error>;

/// Tokenizes a whole source text. Every token is paired with the line it
/// started on. An unrecognized character is fatal.
pub fn lex(s: &str) -> Result<Vec<(LineNumber, Token)>> {
    Lexer::lex(s)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: LineNumber,
}

impl<'a> Lexer<'a> {
    fn lex(s: &str) -> Result<Vec<(LineNumber, Token)>> {
        let mut lexer = Lexer {
            chars: s.chars().peekable(),
            line: 1,
        };
        let mut tokens: Vec<(LineNumber, Token)> = vec![];
        loop {
            lexer.skip_whitespace();
            let line = lexer.line;
            match lexer.next_token()? {
                Some(token) => tokens.push((line, token)),
                None => return Ok(tokens),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            if *ch == '\n' {
                self.line += 1;
            }
            self.chars.next();
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let pk = match self.chars.peek() {
            Some(pk) => *pk,
            None => return Ok(None),
        };
        if pk.is_ascii_digit() {
            return self.number().map(Some);
        }
        if is_ident_start(pk) {
            return Ok(Some(self.word()));
        }
        self.minutia(pk).map(Some)
    }

    fn number(&mut self) -> Result<Token> {
        let mut n: i64 = 0;
        while let Some(ch) = self.chars.peek() {
            match ch.to_digit(10) {
                Some(d) => {
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(d as i64))
                        .ok_or_else(|| error!(SyntaxError, self.line; "INTEGER TOO LARGE"))?;
                }
                None => break,
            }
            self.chars.next();
        }
        Ok(Token::Integer(n))
    }

    fn word(&mut self) -> Token {
        let mut s = String::new();
        while let Some(ch) = self.chars.peek() {
            if !is_ident_char(*ch) {
                break;
            }
            s.push(*ch);
            self.chars.next();
        }
        match Word::from_string(&s) {
            Some(word) => Token::Word(word),
            None => Token::Ident(s.into()),
        }
    }

    /// Returns the second member when the next character is `follow`,
    /// otherwise the first.
    fn either(&mut self, follow: char, short: Operator, long: Operator) -> Token {
        if self.chars.peek() == Some(&follow) {
            self.chars.next();
            return Token::Operator(long);
        }
        Token::Operator(short)
    }

    fn minutia(&mut self, ch: char) -> Result<Token> {
        use Operator::*;
        self.chars.next();
        let token = match ch {
            '=' => self.either('=', Assign, Equal),
            '<' => self.either('=', Less, LessEqual),
            '>' => self.either('=', Greater, GreaterEqual),
            '!' => self.either('=', Not, NotEqual),
            '+' => match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    Token::Operator(Increment)
                }
                _ => self.either('=', Plus, AddAssign),
            },
            '-' => match self.chars.peek() {
                Some('-') => {
                    self.chars.next();
                    Token::Operator(Decrement)
                }
                _ => self.either('=', Minus, SubAssign),
            },
            '*' => self.either('=', Multiply, MulAssign),
            '/' => self.either('=', Divide, DivAssign),
            '%' => self.either('=', Modulo, ModAssign),
            '&' => match self.chars.next() {
                Some('&') => Token::Operator(And),
                _ => return Err(error!(UnknownCharacter, self.line)),
            },
            '|' => match self.chars.next() {
                Some('|') => Token::Operator(Or),
                _ => return Err(error!(UnknownCharacter, self.line)),
            },
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ';' => Token::Semicolon,
            _ => return Err(error!(UnknownCharacter, self.line)),
        };
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<Token> {
        lex(s).unwrap().drain(..).map(|(_, t)| t).collect()
    }

    #[test]
    fn test_declaration() {
        use Token::*;
        assert_eq!(
            kinds("declare x = 5;"),
            vec![
                Word(super::Word::Declare),
                Ident("x".into()),
                Operator(super::Operator::Assign),
                Integer(5),
                Semicolon,
            ]
        );
    }

    #[test]
    fn test_compound_operators() {
        use super::Operator::*;
        assert_eq!(
            kinds("++x; y += 1; a == b != c"),
            vec![
                Token::Operator(Increment),
                Token::Ident("x".into()),
                Token::Semicolon,
                Token::Ident("y".into()),
                Token::Operator(AddAssign),
                Token::Integer(1),
                Token::Semicolon,
                Token::Ident("a".into()),
                Token::Operator(Equal),
                Token::Ident("b".into()),
                Token::Operator(NotEqual),
                Token::Ident("c".into()),
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = lex("declare x;\nx = 2;\n\noutput x;").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![1, 1, 1, 2, 2, 2, 2, 4, 4, 4]);
    }

    #[test]
    fn test_integer_too_large() {
        assert_eq!(kinds("output 9223372036854775807;")[1], Token::Integer(i64::MAX));
        let error = lex("declare x;\noutput 99999999999999999999;").unwrap_err();
        assert_eq!(error.to_string(), "SYNTAX ERROR IN LINE 2; INTEGER TOO LARGE");
    }

    #[test]
    fn test_unknown_character() {
        let error = lex("declare x;\nx = $2;").unwrap_err();
        assert_eq!(error.to_string(), "UNKNOWN CHARACTER IN LINE 2");
        assert!(lex("a & b").is_err());
    }
}
