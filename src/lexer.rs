use crate::token::{Lexeme, Token};
use custom_error::custom_error;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub LexError

    ExpectedRegexStart{found: char} = "expected '/' to start regex, got '{found}'",
    UnterminatedRegex = "unterminated regex",
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    ch: char,
    line: usize,
    col: usize,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl Iterator for Lexer {
    type Item = Lexeme;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_token())
    }
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            input: input.chars().collect(),
            position: 0,
            read_position: 0,
            ch: '\0',
            line: 1,
            col: 0,
        };
        lexer.read_char();
        lexer
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.ch = self.input.get(self.read_position).copied().unwrap_or('\0');
        self.position = self.read_position;
        self.read_position += 1;
    }

    fn peek_char(&self) -> char {
        self.input.get(self.read_position).copied().unwrap_or('\0')
    }

    /// Moves the cursor back (or forward) to `offset`, which must be the start of
    /// a token this lexer produced at `line`/`col`.
    pub fn rewind(&mut self, offset: usize, line: usize, col: usize) {
        self.position = offset;
        self.read_position = offset + 1;
        self.ch = self.input.get(offset).copied().unwrap_or('\0');
        self.line = line;
        self.col = col;
    }

    pub fn next_token(&mut self) -> Lexeme {
        self.skip_whitespace();

        let (line, col, offset) = (self.line, self.col, self.position);
        Lexeme::new(self.read_token(), line, col, offset)
    }

    fn read_token(&mut self) -> Token {
        let token = match self.ch {
            '=' => match self.peek_char() {
                '=' => self.read_pair(Token::Eq),
                '>' => self.read_pair(Token::Arrow),
                _ => Token::Assign,
            },
            '+' => {
                if self.peek_char() == '+' {
                    self.read_pair(Token::Concat)
                } else {
                    Token::Plus
                }
            }
            '-' => Token::Minus,
            '!' => match self.peek_char() {
                '=' => self.read_pair(Token::NotEq),
                '~' => self.read_pair(Token::NotMatch),
                _ => Token::Bang,
            },
            '*' => Token::Asterisk,
            // Division or the start of a regex; the parser decides which.
            '/' => Token::Slash,
            '%' => Token::Percent,
            '<' => {
                if self.peek_char() == '=' {
                    self.read_pair(Token::Lte)
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.peek_char() == '=' {
                    self.read_pair(Token::Gte)
                } else {
                    Token::Gt
                }
            }
            '~' => Token::Match,
            '.' => {
                if self.peek_char() == '.' {
                    self.read_pair(Token::Range)
                } else {
                    Token::Illegal('.')
                }
            }
            '|' => {
                if self.peek_char() == '>' {
                    self.read_pair(Token::Pipe)
                } else {
                    Token::Illegal('|')
                }
            }
            ';' => Token::Semicolon,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '\n' => Token::Newline,
            '"' => Token::String(self.read_string()),
            '\0' => return Token::Eof,
            c => {
                if is_letter(c) {
                    return Token::from(self.read_identifier().as_str());
                } else if c.is_ascii_digit() {
                    return self.read_number();
                } else {
                    Token::Illegal(c)
                }
            }
        };
        self.read_char();
        token
    }

    fn read_pair(&mut self, token: Token) -> Token {
        self.read_char();
        token
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while is_letter(self.ch) || self.ch.is_ascii_digit() {
            self.read_char()
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char()
        }

        let is_float = self.ch == '.' && self.peek_char().is_ascii_digit();
        if is_float {
            self.read_char();
            while self.ch.is_ascii_digit() {
                self.read_char()
            }
        }

        let text: String = self.input[start..self.position].iter().collect();
        if is_float {
            Token::Float(text)
        } else {
            Token::Int(text)
        }
    }

    // Leaves the cursor on the closing quote (or end of input).
    fn read_string(&mut self) -> String {
        let mut result = String::new();
        self.read_char();

        while self.ch != '"' && self.ch != '\0' {
            if self.ch == '\\' {
                self.read_char();
                match self.ch {
                    'n' => result.push('\n'),
                    't' => result.push('\t'),
                    'r' => result.push('\r'),
                    '"' => result.push('"'),
                    '\\' => result.push('\\'),
                    '{' => result.push('{'),
                    '\0' => {
                        result.push('\\');
                        break;
                    }
                    other => {
                        result.push('\\');
                        result.push(other);
                    }
                }
            } else {
                result.push(self.ch);
            }
            self.read_char();
        }

        result
    }

    /// Reads a regex whose opening `/` has not been consumed yet.
    pub fn read_regex_from_start(&mut self) -> Result<String, LexError> {
        while self.ch == ' ' || self.ch == '\t' {
            self.read_char();
        }

        if self.ch != '/' {
            return Err(LexError::ExpectedRegexStart { found: self.ch });
        }
        self.read_char();

        self.read_regex()
    }

    /// Reads a regex body up to and including its closing `/`; the opening `/`
    /// has already been consumed.
    pub fn read_regex(&mut self) -> Result<String, LexError> {
        let mut result = String::new();

        while self.ch != '/' && self.ch != '\0' && self.ch != '\n' {
            if self.ch == '\\' {
                result.push('\\');
                self.read_char();
                if self.ch != '\0' {
                    result.push(self.ch);
                }
            } else {
                result.push(self.ch);
            }
            self.read_char();
        }

        if self.ch != '/' {
            return Err(LexError::UnterminatedRegex);
        }
        self.read_char();

        Ok(result)
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.ch {
                ' ' | '\t' | '\r' => self.read_char(),
                '#' => {
                    while self.ch != '\n' && self.ch != '\0' {
                        self.read_char();
                    }
                }
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::TokenType;

    fn token_types(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = vec![];
        loop {
            let lexeme = lexer.next_token();
            if lexeme.is(TokenType::Eof) {
                return tokens;
            }
            tokens.push(lexeme.token);
        }
    }

    #[test]
    fn test_next_token() {
        let input = "let five = 5;
let add = fn(x, y=2) {
  x + y
}
!-/*5 % 3
a <= b >= c != d == e
\"hi\" ++ \"there\" |> upper
1..10
s !~ t ~ u => v
[1, 2]: null and or not
for x in xs { while true {} }
";

        let cases = [
            (TokenType::Let, "let"),
            (TokenType::Ident, "five"),
            (TokenType::Assign, "="),
            (TokenType::Int, "5"),
            (TokenType::Semicolon, ";"),
            (TokenType::Newline, "\n"),
            (TokenType::Let, "let"),
            (TokenType::Ident, "add"),
            (TokenType::Assign, "="),
            (TokenType::Function, "fn"),
            (TokenType::LParen, "("),
            (TokenType::Ident, "x"),
            (TokenType::Comma, ","),
            (TokenType::Ident, "y"),
            (TokenType::Assign, "="),
            (TokenType::Int, "2"),
            (TokenType::RParen, ")"),
            (TokenType::LBrace, "{"),
            (TokenType::Newline, "\n"),
            (TokenType::Ident, "x"),
            (TokenType::Plus, "+"),
            (TokenType::Ident, "y"),
            (TokenType::Newline, "\n"),
            (TokenType::RBrace, "}"),
            (TokenType::Newline, "\n"),
            (TokenType::Bang, "!"),
            (TokenType::Minus, "-"),
            (TokenType::Slash, "/"),
            (TokenType::Asterisk, "*"),
            (TokenType::Int, "5"),
            (TokenType::Percent, "%"),
            (TokenType::Int, "3"),
            (TokenType::Newline, "\n"),
            (TokenType::Ident, "a"),
            (TokenType::Lte, "<="),
            (TokenType::Ident, "b"),
            (TokenType::Gte, ">="),
            (TokenType::Ident, "c"),
            (TokenType::NotEq, "!="),
            (TokenType::Ident, "d"),
            (TokenType::Eq, "=="),
            (TokenType::Ident, "e"),
            (TokenType::Newline, "\n"),
            (TokenType::String, "hi"),
            (TokenType::Concat, "++"),
            (TokenType::String, "there"),
            (TokenType::Pipe, "|>"),
            (TokenType::Ident, "upper"),
            (TokenType::Newline, "\n"),
            (TokenType::Int, "1"),
            (TokenType::Range, ".."),
            (TokenType::Int, "10"),
            (TokenType::Newline, "\n"),
            (TokenType::Ident, "s"),
            (TokenType::NotMatch, "!~"),
            (TokenType::Ident, "t"),
            (TokenType::Match, "~"),
            (TokenType::Ident, "u"),
            (TokenType::Arrow, "=>"),
            (TokenType::Ident, "v"),
            (TokenType::Newline, "\n"),
            (TokenType::LBracket, "["),
            (TokenType::Int, "1"),
            (TokenType::Comma, ","),
            (TokenType::Int, "2"),
            (TokenType::RBracket, "]"),
            (TokenType::Colon, ":"),
            (TokenType::Null, "null"),
            (TokenType::And, "and"),
            (TokenType::Or, "or"),
            (TokenType::Not, "not"),
            (TokenType::Newline, "\n"),
            (TokenType::For, "for"),
            (TokenType::Ident, "x"),
            (TokenType::In, "in"),
            (TokenType::Ident, "xs"),
            (TokenType::LBrace, "{"),
            (TokenType::While, "while"),
            (TokenType::True, "true"),
            (TokenType::LBrace, "{"),
            (TokenType::RBrace, "}"),
            (TokenType::RBrace, "}"),
            (TokenType::Newline, "\n"),
            (TokenType::Eof, ""),
        ];

        let lexer = Lexer::new(input);

        for ((token_type, literal), lexeme) in cases.iter().zip(lexer) {
            assert_eq!(lexeme.token_type(), *token_type);
            assert_eq!(lexeme.token.literal(), *literal);
        }
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            token_types("3.14 7. 1..5"),
            vec![
                Token::Float("3.14".to_owned()),
                Token::Int("7".to_owned()),
                Token::Illegal('.'),
                Token::Int("1".to_owned()),
                Token::Range,
                Token::Int("5".to_owned()),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let cases = [
            (r#""a\nb""#, "a\nb"),
            (r#""tab\there""#, "tab\there"),
            (r#""say \"hi\"""#, "say \"hi\""),
            (r#""back\\slash""#, "back\\slash"),
            (r#""brace \{x}""#, "brace {x}"),
            (r#""keep \d""#, "keep \\d"),
            ("\"unterminated", "unterminated"),
        ];

        for (input, expected) in cases.iter() {
            assert_eq!(
                token_types(input),
                vec![Token::String((*expected).to_owned())]
            );
        }
    }

    #[test]
    fn test_comments_and_positions() {
        let mut lexer = Lexer::new("# heading\nlet x = 1 # trailing\n  x");

        let expected = [
            (TokenType::Newline, 1, 10),
            (TokenType::Let, 2, 1),
            (TokenType::Ident, 2, 5),
            (TokenType::Assign, 2, 7),
            (TokenType::Int, 2, 9),
            (TokenType::Newline, 2, 21),
            (TokenType::Ident, 3, 3),
            (TokenType::Eof, 3, 4),
        ];

        for (token_type, line, col) in expected.iter() {
            let lexeme = lexer.next_token();
            assert_eq!(
                (lexeme.token_type(), lexeme.line, lexeme.col),
                (*token_type, *line, *col)
            );
        }
    }

    #[test]
    fn test_unicode_identifiers_are_illegal() {
        assert_eq!(
            token_types("\"héllo\" é"),
            vec![Token::String("héllo".to_owned()), Token::Illegal('é')]
        );
    }

    #[test]
    fn test_read_regex() {
        let mut lexer = Lexer::new(r"\w+\/x/ rest");
        assert_eq!(lexer.read_regex(), Ok(r"\w+\/x".to_owned()));
        assert_eq!(lexer.next_token().token, Token::Ident("rest".to_owned()));

        let mut lexer = Lexer::new("  /ab+c/");
        assert_eq!(lexer.read_regex_from_start(), Ok("ab+c".to_owned()));
        assert_eq!(lexer.next_token().token, Token::Eof);
    }

    #[test]
    fn test_read_regex_errors() {
        let mut lexer = Lexer::new("abc\n/");
        assert_eq!(lexer.read_regex(), Err(LexError::UnterminatedRegex));

        let mut lexer = Lexer::new("abc");
        assert_eq!(lexer.read_regex(), Err(LexError::UnterminatedRegex));

        let mut lexer = Lexer::new("x/");
        assert_eq!(
            lexer.read_regex_from_start(),
            Err(LexError::ExpectedRegexStart { found: 'x' })
        );
        assert_eq!(
            LexError::ExpectedRegexStart { found: 'x' }.to_string(),
            "expected '/' to start regex, got 'x'"
        );
    }

    #[test]
    fn test_rewind() {
        let mut lexer = Lexer::new("a ~ /b c/");
        lexer.next_token();
        lexer.next_token();
        let slash = lexer.next_token();
        assert!(slash.is(TokenType::Slash));
        // the lookahead already consumed part of the regex body
        lexer.next_token();

        lexer.rewind(slash.offset, slash.line, slash.col);
        assert_eq!(lexer.read_regex_from_start(), Ok("b c".to_owned()));
    }
}
