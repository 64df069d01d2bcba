use crate::ast::{self, Expression, Statement};
use crate::lexer::Lexer;
use crate::token::{Lexeme, Token, TokenType};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace};


#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Pipe,
    Or,
    And,
    Equals,
    LessGreater,
    Match,
    Range,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl From<TokenType> for Precedence {
    fn from(token_type: TokenType) -> Self {
        match token_type {
            TokenType::Assign => Self::Assign,
            TokenType::Pipe => Self::Pipe,
            TokenType::Or => Self::Or,
            TokenType::And => Self::And,
            TokenType::Eq | TokenType::NotEq => Self::Equals,
            TokenType::Lt | TokenType::Gt | TokenType::Lte | TokenType::Gte => Self::LessGreater,
            TokenType::Match | TokenType::NotMatch => Self::Match,
            TokenType::Range => Self::Range,
            TokenType::Plus | TokenType::Minus | TokenType::Concat => Self::Sum,
            TokenType::Asterisk | TokenType::Slash | TokenType::Percent => Self::Product,
            TokenType::LParen => Self::Call,
            TokenType::LBracket => Self::Index,
            _ => Self::Lowest,
        }
    }
}

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

lazy_static! {
    static ref PREFIX_PARSE_FNS: HashMap<TokenType, PrefixParseFn> = {
        let mut table: HashMap<TokenType, PrefixParseFn> = HashMap::new();
        table.insert(TokenType::Ident, Parser::parse_identifier);
        table.insert(TokenType::Int, Parser::parse_integer_literal);
        table.insert(TokenType::Float, Parser::parse_float_literal);
        table.insert(TokenType::String, Parser::parse_string_literal);
        table.insert(TokenType::True, Parser::parse_boolean);
        table.insert(TokenType::False, Parser::parse_boolean);
        table.insert(TokenType::Null, Parser::parse_null);
        table.insert(TokenType::Bang, Parser::parse_prefix_expression);
        table.insert(TokenType::Minus, Parser::parse_prefix_expression);
        table.insert(TokenType::Not, Parser::parse_prefix_expression);
        table.insert(TokenType::LParen, Parser::parse_grouped_expression);
        table.insert(TokenType::If, Parser::parse_if_expression);
        table.insert(TokenType::Function, Parser::parse_function_literal);
        table.insert(TokenType::LBracket, Parser::parse_array_literal);
        table.insert(TokenType::LBrace, Parser::parse_map_literal);
        table.insert(TokenType::Slash, Parser::parse_regex_literal);
        table
    };
    static ref INFIX_PARSE_FNS: HashMap<TokenType, InfixParseFn> = {
        let mut table: HashMap<TokenType, InfixParseFn> = HashMap::new();
        for token_type in [
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Slash,
            TokenType::Asterisk,
            TokenType::Percent,
            TokenType::Concat,
            TokenType::Eq,
            TokenType::NotEq,
            TokenType::Lt,
            TokenType::Gt,
            TokenType::Lte,
            TokenType::Gte,
            TokenType::And,
            TokenType::Or,
        ] {
            table.insert(token_type, Parser::parse_infix_expression);
        }
        table.insert(TokenType::Match, Parser::parse_match_expression);
        table.insert(TokenType::NotMatch, Parser::parse_match_expression);
        table.insert(TokenType::Range, Parser::parse_range_expression);
        table.insert(TokenType::Pipe, Parser::parse_pipe_expression);
        table.insert(TokenType::LParen, Parser::parse_call_expression);
        table.insert(TokenType::LBracket, Parser::parse_index_expression);
        table.insert(TokenType::Assign, Parser::parse_assign_expression);
        table
    };
}

/// Parses `source` into a program plus every diagnostic found on the way.
///
/// A program that comes back with diagnostics is incomplete and must not be
/// evaluated.
pub fn parse(source: &str) -> (ast::Program, Vec<String>) {
    Parser::new(Lexer::new(source)).parse_program()
}

pub struct Parser {
    lexer: Lexer,
    cur_token: Lexeme,
    peek_token: Lexeme,
    errors: Vec<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();

        Self {
            lexer,
            cur_token,
            peek_token,
            errors: vec![],
        }
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    pub fn parse_program(mut self) -> (ast::Program, Vec<String>) {
        let mut program = ast::Program::default();

        while !self.cur_token.is(TokenType::Eof) {
            if self.at_separator() {
                self.next_token();
                continue;
            }

            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }

        debug!(
            statements = program.statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        (program, self.errors)
    }

    fn at_separator(&self) -> bool {
        self.cur_token.is(TokenType::Newline) || self.cur_token.is(TokenType::Semicolon)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type() {
            TokenType::Let => self.parse_let_statement().map(Statement::Let),
            TokenType::Return => self.parse_return_statement().map(Statement::Return),
            TokenType::For => self.parse_for_statement().map(Statement::For),
            TokenType::While => self.parse_while_statement().map(Statement::While),
            _ => self.parse_expression_statement().map(Statement::Expr),
        }
    }

    fn parse_let_statement(&mut self) -> Option<ast::LetStatement> {
        let name = self.expect_identifier()?;
        self.expect_peek(TokenType::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_terminator();

        Some(ast::LetStatement { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<ast::ReturnStatement> {
        let bare = [
            TokenType::Newline,
            TokenType::Semicolon,
            TokenType::RBrace,
            TokenType::Eof,
        ]
        .iter()
        .any(|t| self.peek_token.is(*t));

        let return_value = if bare {
            None
        } else {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        };
        self.skip_terminator();

        Some(ast::ReturnStatement { return_value })
    }

    fn parse_for_statement(&mut self) -> Option<ast::ForStatement> {
        let variable = self.expect_identifier()?;
        self.expect_peek(TokenType::In)?;
        self.next_token();

        let iterable = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;

        Some(ast::ForStatement {
            variable,
            iterable,
            body,
        })
    }

    fn parse_while_statement(&mut self) -> Option<ast::WhileStatement> {
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;

        Some(ast::WhileStatement { condition, body })
    }

    fn parse_expression_statement(&mut self) -> Option<ast::ExpressionStatement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_terminator();

        Some(ast::ExpressionStatement { expression })
    }

    // Called with the current token on `{`; leaves it on the matching `}`.
    fn parse_block_statement(&mut self) -> Option<ast::BlockStatement> {
        let mut block = ast::BlockStatement::default();
        self.next_token();

        while !self.cur_token.is(TokenType::RBrace) {
            if self.cur_token.is(TokenType::Eof) {
                self.error(format!(
                    "expected {}, got {} instead",
                    TokenType::RBrace,
                    TokenType::Eof
                ));
                return None;
            }

            if !self.at_separator() {
                if let Some(stmt) = self.parse_statement() {
                    block.statements.push(stmt);
                }
            }
            self.next_token();
        }

        Some(block)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match PREFIX_PARSE_FNS.get(&self.cur_token.token_type()) {
            Some(prefix) => *prefix,
            None => {
                let message = format!(
                    "no prefix parse function for {}",
                    self.cur_token.token_type()
                );
                self.error(message);
                return None;
            }
        };

        let mut left = prefix(self)?;

        while !self.peek_token.is(TokenType::Semicolon)
            && !self.peek_token.is(TokenType::Newline)
            && precedence < self.peek_precedence()
        {
            let infix = match INFIX_PARSE_FNS.get(&self.peek_token.token_type()) {
                Some(infix) => *infix,
                None => return Some(left),
            };

            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.cur_token.token.literal().into()))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let literal = self.cur_token.token.literal();
        match literal.parse() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.error(format!("could not parse {:?} as integer", literal));
                None
            }
        }
    }

    fn parse_float_literal(&mut self) -> Option<Expression> {
        let literal = self.cur_token.token.literal();
        match literal.parse() {
            Ok(value) => Some(Expression::FloatLiteral(value)),
            Err(_) => {
                self.error(format!("could not parse {:?} as float", literal));
                None
            }
        }
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.cur_token.is(TokenType::True)))
    }

    fn parse_null(&mut self) -> Option<Expression> {
        Some(Expression::Null)
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let value = self.cur_token.token.literal();
        let parts = self.parse_string_parts(&value);

        Some(Expression::String(ast::StringLiteral { value, parts }))
    }

    /// Splits processed string text into literal runs and `{…}` spans. A `{`
    /// with no matching `}` stays literal text.
    fn parse_string_parts(&mut self, text: &str) -> Vec<ast::StringPart> {
        let chars: Vec<char> = text.chars().collect();
        let mut parts = vec![];
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] == '{' {
                if let Some(close) = matching_brace(&chars, i) {
                    if !literal.is_empty() {
                        parts.push(ast::StringPart::Text(std::mem::take(&mut literal)));
                    }

                    let source: String = chars[i + 1..close].iter().collect();
                    if let Some(expr) = self.parse_interpolation(&source) {
                        parts.push(ast::StringPart::Expr(expr));
                    }

                    i = close + 1;
                    continue;
                }
            }

            literal.push(chars[i]);
            i += 1;
        }

        if !literal.is_empty() {
            parts.push(ast::StringPart::Text(literal));
        }

        parts
    }

    fn parse_interpolation(&mut self, source: &str) -> Option<Expression> {
        trace!(source, "parsing interpolated expression");

        let (program, _) = parse(source);

        match program.statements.into_iter().next() {
            Some(Statement::Expr(stmt)) => Some(stmt.expression),
            _ => None,
        }
    }

    fn parse_regex_literal(&mut self) -> Option<Expression> {
        let slash = self.cur_token.clone();

        // The lookahead was lexed from the regex body; read it again raw.
        self.lexer.rewind(slash.offset + 1, slash.line, slash.col + 1);
        let pattern = match self.lexer.read_regex() {
            Ok(pattern) => pattern,
            Err(err) => {
                self.error(format!("invalid regex: {}", err));
                return None;
            }
        };

        self.resync(Lexeme::new(
            Token::Regex(pattern.clone()),
            slash.line,
            slash.col,
            slash.offset,
        ));

        Some(Expression::Regex(pattern))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = ast::Operator::from_token(&self.cur_token.token)?;
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix(ast::PrefixExpression {
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = ast::Operator::from_token(&self.cur_token.token)?;
        let precedence = self.cur_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix(ast::InfixExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    /// `~` and `!~` take a regex literal on the right. The lookahead has
    /// already been lexed as ordinary tokens, so the lexer is rewound to it and
    /// the pattern is read raw.
    fn parse_match_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = ast::Operator::from_token(&self.cur_token.token)?;
        let start = self.peek_token.clone();

        self.lexer.rewind(start.offset, start.line, start.col);
        let pattern = match self.lexer.read_regex_from_start() {
            Ok(pattern) => pattern,
            Err(err) => {
                self.error(format!("invalid regex: {}", err));
                return None;
            }
        };

        self.resync(Lexeme::new(
            Token::Regex(pattern.clone()),
            start.line,
            start.col,
            start.offset,
        ));

        Some(Expression::Infix(ast::InfixExpression {
            left: Box::new(left),
            operator,
            right: Box::new(Expression::Regex(pattern)),
        }))
    }

    fn parse_range_expression(&mut self, start: Expression) -> Option<Expression> {
        self.next_token();
        let end = self.parse_expression(Precedence::Range)?;

        Some(Expression::Range(ast::RangeLiteral {
            start: Box::new(start),
            end: Box::new(end),
        }))
    }

    fn parse_pipe_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Pipe)?;

        Some(Expression::Pipe(ast::PipeExpression {
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_assign_expression(&mut self, target: Expression) -> Option<Expression> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        Some(Expression::Assign(ast::AssignExpression {
            target: Box::new(target),
            value: Box::new(value),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RParen)?;

        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(TokenType::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_token.is(TokenType::Else) {
            self.next_token();

            if self.peek_token.is(TokenType::If) {
                self.next_token();
                let expression = self.parse_if_expression()?;
                Some(ast::BlockStatement {
                    statements: vec![Statement::Expr(ast::ExpressionStatement { expression })],
                })
            } else {
                self.expect_peek(TokenType::LBrace)?;
                Some(self.parse_block_statement()?)
            }
        } else {
            None
        };

        Some(Expression::If(ast::IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
        }))
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let name = if self.peek_token.is(TokenType::Ident) {
            self.next_token();
            Some(self.cur_token.token.literal())
        } else {
            None
        };

        self.expect_peek(TokenType::LParen)?;
        let parameters = self.parse_list(TokenType::RParen, Self::parse_parameter)?;

        self.expect_peek(TokenType::LBrace)?;
        let body = self.parse_block_statement()?;

        Some(Expression::Function(ast::FunctionLiteral {
            name,
            parameters: Rc::new(parameters),
            body: Rc::new(body),
        }))
    }

    fn parse_parameter(&mut self) -> Option<ast::Parameter> {
        let name = self.expect_identifier()?;

        let default = if self.peek_token.is(TokenType::Assign) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        Some(ast::Parameter { name, default })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_list(TokenType::RParen, Self::parse_call_argument)?;

        Some(Expression::Call(ast::CallExpression {
            function: Box::new(function),
            arguments,
        }))
    }

    fn parse_call_argument(&mut self) -> Option<ast::CallArgument> {
        self.next_token();

        let name = if self.cur_token.is(TokenType::Ident) && self.peek_token.is(TokenType::Assign) {
            let name = self.cur_token.token.literal();
            self.next_token();
            self.next_token();
            Some(name)
        } else {
            None
        };

        let value = self.parse_expression(Precedence::Lowest)?;

        Some(ast::CallArgument { name, value })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_list(TokenType::RBracket, Self::parse_list_element)?;

        Some(Expression::Array(elements.into()))
    }

    fn parse_list_element(&mut self) -> Option<Expression> {
        self.next_token();
        self.parse_expression(Precedence::Lowest)
    }

    fn parse_map_literal(&mut self) -> Option<Expression> {
        let mut pairs = vec![];
        self.skip_peek_newlines();

        while !self.peek_token.is(TokenType::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenType::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            while self.peek_token.is(TokenType::Comma) || self.peek_token.is(TokenType::Newline) {
                self.next_token();
            }
        }

        self.expect_peek(TokenType::RBrace)?;

        Some(Expression::Map(pairs.into()))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RBracket)?;

        Some(Expression::Index(ast::IndexExpression {
            left: Box::new(left),
            index: Box::new(index),
        }))
    }

    /// Parses a comma separated list closed by `end`, tolerating newlines
    /// between elements and a trailing comma. `parse_item` is called with the
    /// current token just before the element and must advance onto it.
    fn parse_list<T>(
        &mut self,
        end: TokenType,
        parse_item: fn(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut items = vec![];
        self.skip_peek_newlines();

        while !self.peek_token.is(end) {
            items.push(parse_item(self)?);
            self.skip_peek_newlines();

            if !self.peek_token.is(TokenType::Comma) {
                break;
            }
            self.next_token();
            self.skip_peek_newlines();
        }

        self.expect_peek(end)?;

        Some(items)
    }

    fn expect_identifier(&mut self) -> Option<ast::Identifier> {
        self.expect_peek(TokenType::Ident)?;

        Some(self.cur_token.token.literal().into())
    }

    fn expect_peek(&mut self, expected: TokenType) -> Option<()> {
        if self.peek_token.is(expected) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(expected);
            None
        }
    }

    fn peek_error(&mut self, expected: TokenType) {
        let message = format!(
            "expected {}, got {} instead",
            expected,
            self.peek_token.token_type()
        );
        self.error(message);
    }

    fn error(&mut self, message: String) {
        self.errors.push(format!(
            "line {}, col {}: {}",
            self.cur_token.line, self.cur_token.col, message
        ));
    }

    fn skip_terminator(&mut self) {
        if self.peek_token.is(TokenType::Semicolon) || self.peek_token.is(TokenType::Newline) {
            self.next_token();
        }
    }

    fn skip_peek_newlines(&mut self) {
        while self.peek_token.is(TokenType::Newline) {
            self.next_token();
        }
    }

    /// Re-establishes the token window after the lexer was driven by hand.
    fn resync(&mut self, current: Lexeme) {
        self.cur_token = current;
        self.peek_token = self.lexer.next_token();
    }

    fn peek_precedence(&self) -> Precedence {
        self.peek_token.token_type().into()
    }

    fn cur_precedence(&self) -> Precedence {
        self.cur_token.token_type().into()
    }
}

fn matching_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, c) in chars.iter().enumerate().skip(open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
