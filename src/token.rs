use strum_macros::{Display, EnumDiscriminants};

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(derive(Hash, Display))]
#[strum_discriminants(name(TokenType))]
#[strum_discriminants(strum(serialize_all = "SCREAMING_SNAKE_CASE"))]
pub enum Token {
    Illegal(char),
    Eof,

    // Identifiers and literals
    Ident(String),
    Int(String),
    Float(String),
    String(String),
    Regex(String),

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Percent,
    Lt,
    Gt,
    Eq,
    NotEq,
    Lte,
    Gte,
    Concat,
    Pipe,
    Match,
    #[strum_discriminants(strum(serialize = "NOTMATCH"))]
    NotMatch,
    Range,
    Arrow,

    // Delimiters
    Comma,
    Colon,
    Semicolon,
    Newline,

    #[strum_discriminants(strum(serialize = "LPAREN"))]
    LParen,
    #[strum_discriminants(strum(serialize = "RPAREN"))]
    RParen,
    #[strum_discriminants(strum(serialize = "LBRACE"))]
    LBrace,
    #[strum_discriminants(strum(serialize = "RBRACE"))]
    RBrace,
    #[strum_discriminants(strum(serialize = "LBRACKET"))]
    LBracket,
    #[strum_discriminants(strum(serialize = "RBRACKET"))]
    RBracket,

    // Keywords
    Let,
    #[strum_discriminants(strum(serialize = "FN"))]
    Function,
    True,
    False,
    If,
    Else,
    Return,
    For,
    In,
    While,
    And,
    Or,
    Not,
    Null,

    // Reserved, no grammar attached
    Try,
    Catch,
    /// Keeps the `MATCH_KW` kind name; `match` itself lexes as an identifier
    /// so the `match` builtin stays callable.
    MatchKw,
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        match text {
            "let" => Self::Let,
            "fn" => Self::Function,
            "true" => Self::True,
            "false" => Self::False,
            "if" => Self::If,
            "else" => Self::Else,
            "return" => Self::Return,
            "for" => Self::For,
            "in" => Self::In,
            "while" => Self::While,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "null" => Self::Null,
            "try" => Self::Try,
            "catch" => Self::Catch,
            identifier => Self::Ident(identifier.to_owned()),
        }
    }
}

impl Token {
    pub fn is(&self, token_type: TokenType) -> bool {
        TokenType::from(self) == token_type
    }

    /// The source text this token stands for.
    pub fn literal(&self) -> String {
        let text = match self {
            Self::Illegal(c) => return c.to_string(),
            Self::Ident(s) | Self::Int(s) | Self::Float(s) | Self::String(s) => return s.clone(),
            Self::Regex(pattern) => return format!("/{}/", pattern),
            Self::Eof => "",
            Self::Assign => "=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Concat => "++",
            Self::Pipe => "|>",
            Self::Match => "~",
            Self::NotMatch => "!~",
            Self::Range => "..",
            Self::Arrow => "=>",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Newline => "\n",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Let => "let",
            Self::Function => "fn",
            Self::True => "true",
            Self::False => "false",
            Self::If => "if",
            Self::Else => "else",
            Self::Return => "return",
            Self::For => "for",
            Self::In => "in",
            Self::While => "while",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Null => "null",
            Self::Try => "try",
            Self::Catch => "catch",
            Self::MatchKw => "match",
        };
        text.to_owned()
    }
}

/// A token together with where it was read from.
///
/// `offset` is the character index of the token's first character; the parser
/// hands it back to the lexer when it needs to re-read a regex body.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub line: usize,
    pub col: usize,
    pub offset: usize,
}

impl Lexeme {
    pub fn new(token: Token, line: usize, col: usize, offset: usize) -> Self {
        Self {
            token,
            line,
            col,
            offset,
        }
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token.is(token_type)
    }

    pub fn token_type(&self) -> TokenType {
        TokenType::from(&self.token)
    }
}
