use super::{ast::*, token::*, Error, LineNumber};

type Result<T> = std::result::Result<T, Error>;

/// Token stream in, statement list out.
pub fn parse(tokens: &[(LineNumber, Token)]) -> Result<Vec<Statement>> {
    Parser::parse(tokens)
}

struct Parser<'a> {
    tokens: &'a [(LineNumber, Token)],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [(LineNumber, Token)]) -> Result<Vec<Statement>> {
        let mut parser = Parser { tokens, pos: 0 };
        let mut program: Vec<Statement> = vec![];
        while parser.peek().is_some() {
            program.push(parser.statement()?);
        }
        Ok(program)
    }

    fn line(&self) -> LineNumber {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some((line, _)) => *line,
            None => 1,
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if let Some(t) = self.next() {
            if *t == token {
                return Ok(());
            }
        }
        use Token::*;
        Err(error!(SyntaxError, self.line();
            match token {
                Integer(_) => "EXPECTED INTEGER",
                Ident(_) => "EXPECTED IDENTIFIER",
                Word(_) => "EXPECTED RESERVED WORD",
                Operator(_) => "EXPECTED OPERATOR",
                LParen => "EXPECTED LEFT PARENTHESIS",
                RParen => "EXPECTED RIGHT PARENTHESIS",
                LBracket => "EXPECTED LEFT BRACKET",
                RBracket => "EXPECTED RIGHT BRACKET",
                LBrace => "EXPECTED LEFT BRACE",
                RBrace => "EXPECTED RIGHT BRACE",
                Semicolon => "EXPECTED SEMICOLON",
            }
        ))
    }

    fn ident(&mut self) -> Result<std::rc::Rc<str>> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            _ => Err(error!(SyntaxError, self.line(); "EXPECTED IDENTIFIER")),
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let line = self.line();
        match self.peek() {
            Some(Token::Word(Word::Declare)) => self.declare(line),
            Some(Token::Ident(_)) => self.assignment(line),
            Some(Token::Operator(Operator::Increment)) => self.step(line, StepOp::Up),
            Some(Token::Operator(Operator::Decrement)) => self.step(line, StepOp::Down),
            Some(Token::Word(Word::While)) => self.r#while(line),
            Some(Token::Word(Word::If)) => {
                self.next();
                self.r#if(line)
            }
            Some(Token::Word(Word::Output)) => self.output(line),
            _ => Err(error!(SyntaxError, line; "EXPECTED STATEMENT")),
        }
    }

    fn declare(&mut self, line: LineNumber) -> Result<Statement> {
        self.next();
        let name = self.ident()?;
        let mut len: Option<usize> = None;
        if let Some(Token::LBracket) = self.peek() {
            self.next();
            match self.next() {
                Some(Token::Integer(n)) if *n > 0 => len = Some(*n as usize),
                Some(Token::Integer(_)) => {
                    return Err(error!(SyntaxError, self.line(); "ZERO LENGTH ARRAY"))
                }
                _ => return Err(error!(SyntaxError, self.line(); "EXPECTED ARRAY LENGTH")),
            }
            self.expect(Token::RBracket)?;
        }
        let mut init: Option<Expression> = None;
        if let Some(Token::Operator(Operator::Assign)) = self.peek() {
            if len.is_some() {
                return Err(error!(SyntaxError, self.line(); "ARRAY WITH INITIALIZER"));
            }
            self.next();
            init = Some(self.expression()?);
        }
        self.expect(Token::Semicolon)?;
        Ok(Statement::Declare(line, name, len, init))
    }

    fn assignment(&mut self, line: LineNumber) -> Result<Statement> {
        let var = self.variable()?;
        use Operator::*;
        let op = match self.next() {
            Some(Token::Operator(Assign)) => AssignOp::Set,
            Some(Token::Operator(AddAssign)) => AssignOp::Add,
            Some(Token::Operator(SubAssign)) => AssignOp::Subtract,
            Some(Token::Operator(MulAssign)) => AssignOp::Multiply,
            Some(Token::Operator(DivAssign)) => AssignOp::Divide,
            Some(Token::Operator(ModAssign)) => AssignOp::Modulo,
            _ => return Err(error!(SyntaxError, self.line(); "EXPECTED ASSIGNMENT OPERATOR")),
        };
        let expr = self.expression()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Assign(line, var, op, expr))
    }

    fn step(&mut self, line: LineNumber, op: StepOp) -> Result<Statement> {
        self.next();
        let var = self.variable()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Step(line, op, var))
    }

    fn r#while(&mut self, line: LineNumber) -> Result<Statement> {
        self.next();
        self.expect(Token::LParen)?;
        let condition = self.bool_expr()?;
        self.expect(Token::RParen)?;
        let body = self.body()?;
        Ok(Statement::While(line, condition, body))
    }

    // The leading `if` word is already consumed so else-if chains can
    // recurse here directly.
    fn r#if(&mut self, line: LineNumber) -> Result<Statement> {
        self.expect(Token::LParen)?;
        let condition = self.bool_expr()?;
        self.expect(Token::RParen)?;
        let body = self.body()?;
        let mut else_body: Vec<Statement> = vec![];
        if let Some(Token::Word(Word::Else)) = self.peek() {
            self.next();
            if let Some(Token::Word(Word::If)) = self.peek() {
                let line = self.line();
                self.next();
                else_body.push(self.r#if(line)?);
            } else {
                else_body = self.body()?;
            }
        }
        Ok(Statement::If(line, condition, body, else_body))
    }

    fn output(&mut self, line: LineNumber) -> Result<Statement> {
        self.next();
        let expr = self.expression()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Output(line, expr))
    }

    fn body(&mut self) -> Result<Vec<Statement>> {
        if let Some(Token::LBrace) = self.peek() {
            self.next();
            let mut statements: Vec<Statement> = vec![];
            loop {
                match self.peek() {
                    Some(Token::RBrace) => {
                        self.next();
                        return Ok(statements);
                    }
                    Some(_) => statements.push(self.statement()?),
                    None => return Err(error!(SyntaxError, self.line(); "EXPECTED RIGHT BRACE")),
                }
            }
        }
        Ok(vec![self.statement()?])
    }

    fn bool_expr(&mut self) -> Result<Condition> {
        let mut lhs = self.bool_term()?;
        while let Some(Token::Operator(Operator::Or)) = self.peek() {
            self.next();
            let rhs = self.bool_term()?;
            lhs = Condition::Either(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn bool_term(&mut self) -> Result<Condition> {
        let mut lhs = self.bool_factor()?;
        while let Some(Token::Operator(Operator::And)) = self.peek() {
            self.next();
            let rhs = self.bool_factor()?;
            lhs = Condition::Both(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // `(` is ambiguous here: it may open a parenthesized condition or an
    // arithmetic sub-expression. Try the comparison reading first and
    // rewind on failure.
    fn bool_factor(&mut self) -> Result<Condition> {
        if let Some(Token::Operator(Operator::Not)) = self.peek() {
            self.next();
            return Ok(Condition::Not(Box::new(self.bool_expr()?)));
        }
        let saved = self.pos;
        match self.comparison() {
            Ok(condition) => Ok(condition),
            Err(error) => {
                if let Some(Token::LParen) = self.tokens.get(saved).map(|(_, t)| t) {
                    self.pos = saved;
                    self.next();
                    let condition = self.bool_expr()?;
                    self.expect(Token::RParen)?;
                    Ok(condition)
                } else {
                    Err(error)
                }
            }
        }
    }

    fn comparison(&mut self) -> Result<Condition> {
        let lhs = self.expression()?;
        use Operator::*;
        let op = match self.peek() {
            Some(Token::Operator(Equal)) => CmpOp::Equal,
            Some(Token::Operator(NotEqual)) => CmpOp::NotEqual,
            Some(Token::Operator(Less)) => CmpOp::Less,
            Some(Token::Operator(LessEqual)) => CmpOp::LessEqual,
            Some(Token::Operator(Greater)) => CmpOp::Greater,
            Some(Token::Operator(GreaterEqual)) => CmpOp::GreaterEqual,
            // A bare expression counts as "is it nonzero".
            _ => {
                return Ok(Condition::Compare(
                    Box::new(lhs),
                    CmpOp::NotEqual,
                    Box::new(Expression::Number(0)),
                ))
            }
        };
        self.next();
        let rhs = self.expression()?;
        Ok(Condition::Compare(Box::new(lhs), op, Box::new(rhs)))
    }

    fn expression(&mut self) -> Result<Expression> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(Operator::Plus)) => BinOp::Add,
                Some(Token::Operator(Operator::Minus)) => BinOp::Subtract,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.term()?;
            lhs = Expression::Binary(Box::new(lhs), op, Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expression> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Operator(Operator::Multiply)) => BinOp::Multiply,
                Some(Token::Operator(Operator::Divide)) => BinOp::Divide,
                Some(Token::Operator(Operator::Modulo)) => BinOp::Modulo,
                _ => return Ok(lhs),
            };
            self.next();
            let rhs = self.factor()?;
            lhs = Expression::Binary(Box::new(lhs), op, Box::new(rhs));
        }
    }

    fn factor(&mut self) -> Result<Expression> {
        match self.peek() {
            Some(Token::LParen) => {
                self.next();
                let expr = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Integer(n)) => {
                let n = *n;
                self.next();
                Ok(Expression::Number(n))
            }
            Some(Token::Ident(_)) => Ok(Expression::Variable(self.variable()?)),
            Some(Token::Operator(Operator::Increment)) => {
                self.next();
                Ok(Expression::Step(StepOp::Up, self.variable()?))
            }
            Some(Token::Operator(Operator::Decrement)) => {
                self.next();
                Ok(Expression::Step(StepOp::Down, self.variable()?))
            }
            _ => Err(error!(SyntaxError, self.line(); "EXPECTED EXPRESSION")),
        }
    }

    fn variable(&mut self) -> Result<Variable> {
        let name = self.ident()?;
        if let Some(Token::LBracket) = self.peek() {
            self.next();
            let index = self.expression()?;
            self.expect(Token::RBracket)?;
            return Ok(Variable::Element(name, Box::new(index)));
        }
        Ok(Variable::Scalar(name))
    }
}

#[cfg(test)]
mod tests {
    use super::super::lex;
    use super::*;

    fn parse_str(s: &str) -> Vec<Statement> {
        match parse(&lex(s).unwrap()) {
            Ok(v) => v,
            Err(e) => panic!("{} : {:?}", e, e),
        }
    }

    #[test]
    fn test_declarations() {
        assert_eq!(
            parse_str("declare x; declare a[3]; declare y = 2;"),
            vec![
                Statement::Declare(1, "x".into(), None, None),
                Statement::Declare(1, "a".into(), Some(3), None),
                Statement::Declare(1, "y".into(), None, Some(Expression::Number(2))),
            ]
        );
        assert!(parse(&lex("declare a[0];").unwrap()).is_err());
        assert!(parse(&lex("declare a[3] = 1;").unwrap()).is_err());
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            parse_str("a[i + 1] -= 2;"),
            vec![Statement::Assign(
                1,
                Variable::Element(
                    "a".into(),
                    Box::new(Expression::Binary(
                        Box::new(Expression::Variable(Variable::Scalar("i".into()))),
                        BinOp::Add,
                        Box::new(Expression::Number(1)),
                    )),
                ),
                AssignOp::Subtract,
                Expression::Number(2),
            )]
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_str("x = 1 + 2 * 3;"),
            vec![Statement::Assign(
                1,
                Variable::Scalar("x".into()),
                AssignOp::Set,
                Expression::Binary(
                    Box::new(Expression::Number(1)),
                    BinOp::Add,
                    Box::new(Expression::Binary(
                        Box::new(Expression::Number(2)),
                        BinOp::Multiply,
                        Box::new(Expression::Number(3)),
                    )),
                ),
            )]
        );
    }

    #[test]
    fn test_while_and_step() {
        let program = parse_str("while (i < 3) { output i; ++i; }");
        match &program[0] {
            Statement::While(1, condition, body) => {
                assert_eq!(
                    *condition,
                    Condition::Compare(
                        Box::new(Expression::Variable(Variable::Scalar("i".into()))),
                        CmpOp::Less,
                        Box::new(Expression::Number(3)),
                    )
                );
                assert_eq!(body.len(), 2);
                assert_eq!(
                    body[1],
                    Statement::Step(1, StepOp::Up, Variable::Scalar("i".into()))
                );
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_else_if_folds() {
        let program = parse_str("if (x == 1) output 1; else if (x == 2) output 2; else output 3;");
        match &program[0] {
            Statement::If(_, _, _, else_body) => match &else_body[0] {
                Statement::If(_, _, _, inner_else) => {
                    assert_eq!(inner_else.len(), 1);
                }
                other => panic!("{:?}", other),
            },
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_condition_forms() {
        // Parenthesized arithmetic on the left of a comparison.
        let program = parse_str("if ((x + 1) < 2) output 1;");
        match &program[0] {
            Statement::If(_, Condition::Compare(_, CmpOp::Less, _), ..) => {}
            other => panic!("{:?}", other),
        }
        // Parenthesized condition combined with another.
        let program = parse_str("if ((x < 1 || y < 1) && z < 1) output 1;");
        match &program[0] {
            Statement::If(_, Condition::Both(left, _), ..) => match **left {
                Condition::Either(..) => {}
                ref other => panic!("{:?}", other),
            },
            other => panic!("{:?}", other),
        }
        // Bare expression desugars to != 0.
        let program = parse_str("while (x) --x;");
        match &program[0] {
            Statement::While(_, Condition::Compare(_, CmpOp::NotEqual, rhs), _) => {
                assert_eq!(**rhs, Expression::Number(0));
            }
            other => panic!("{:?}", other),
        }
        // Negation swallows the whole rest of the condition.
        let program = parse_str("if (!(x == 1) && y == 2) output 1;");
        match &program[0] {
            Statement::If(_, Condition::Not(inner), ..) => match **inner {
                Condition::Both(..) => {}
                ref other => panic!("{:?}", other),
            },
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn test_errors_carry_lines() {
        let error = parse(&lex("declare x\nx = 1;").unwrap()).unwrap_err();
        assert_eq!(error.to_string(), "SYNTAX ERROR IN LINE 2; EXPECTED SEMICOLON");
    }
}
