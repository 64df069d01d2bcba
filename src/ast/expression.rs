use super::{statement::BlockStatement, Identifier};
use crate::token::Token;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    String(StringLiteral),
    Boolean(bool),
    Null,
    Regex(String),
    Array(ArrayLiteral),
    Map(MapLiteral),
    Range(RangeLiteral),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    If(IfExpression),
    Function(FunctionLiteral),
    Call(CallExpression),
    Index(IndexExpression),
    Pipe(PipeExpression),
    Assign(AssignExpression),
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Identifier(expr) => write!(f, "{}", expr),
            Self::IntegerLiteral(n) => write!(f, "{}", n),
            Self::FloatLiteral(n) => write!(f, "{:?}", n),
            Self::String(expr) => write!(f, "{}", expr),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
            Self::Regex(pattern) => write!(f, "/{}/", pattern),
            Self::Array(expr) => write!(f, "{}", expr),
            Self::Map(expr) => write!(f, "{}", expr),
            Self::Range(expr) => write!(f, "{}", expr),
            Self::Prefix(expr) => write!(f, "{}", expr),
            Self::Infix(expr) => write!(f, "{}", expr),
            Self::If(expr) => write!(f, "{}", expr),
            Self::Function(expr) => write!(f, "{}", expr),
            Self::Call(expr) => write!(f, "{}", expr),
            Self::Index(expr) => write!(f, "{}", expr),
            Self::Pipe(expr) => write!(f, "{}", expr),
            Self::Assign(expr) => write!(f, "{}", expr),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Operator {
    #[strum(to_string = "!")]
    Bang,
    #[strum(to_string = "not")]
    Not,
    #[strum(to_string = "-")]
    Minus,
    #[strum(to_string = "+")]
    Plus,
    #[strum(to_string = "*")]
    Asterisk,
    #[strum(to_string = "/")]
    Slash,
    #[strum(to_string = "%")]
    Percent,
    #[strum(to_string = "++")]
    Concat,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = "<=")]
    Lte,
    #[strum(to_string = ">=")]
    Gte,
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    NotEq,
    #[strum(to_string = "and")]
    And,
    #[strum(to_string = "or")]
    Or,
    #[strum(to_string = "~")]
    Match,
    #[strum(to_string = "!~")]
    NotMatch,
}

impl Operator {
    pub fn from_token(token: &Token) -> Option<Self> {
        let operator = match token {
            Token::Bang => Self::Bang,
            Token::Not => Self::Not,
            Token::Minus => Self::Minus,
            Token::Plus => Self::Plus,
            Token::Asterisk => Self::Asterisk,
            Token::Slash => Self::Slash,
            Token::Percent => Self::Percent,
            Token::Concat => Self::Concat,
            Token::Lt => Self::Lt,
            Token::Gt => Self::Gt,
            Token::Lte => Self::Lte,
            Token::Gte => Self::Gte,
            Token::Eq => Self::Eq,
            Token::NotEq => Self::NotEq,
            Token::And => Self::And,
            Token::Or => Self::Or,
            Token::Match => Self::Match,
            Token::NotMatch => Self::NotMatch,
            _ => return None,
        };
        Some(operator)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Text(String),
    Expr(Expression),
}

/// A string literal with its interpolation spans already parsed.
///
/// `value` is the escape-processed text; `parts` is what gets rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub parts: Vec<StringPart>,
}

impl Display for StringLiteral {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub operator: Operator,
    pub right: Box<Expression>,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.operator {
            Operator::Not => write!(f, "(not {})", self.right),
            operator => write!(f, "({}{})", operator, self.right),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;
        if let Some(alt) = &self.alternative {
            write!(f, " else {}", alt)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub default: Option<Expression>,
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match &self.default {
            Some(default) => write!(f, "{} = {}", self.name, default),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub name: Option<String>,
    pub parameters: Rc<Vec<Parameter>>,
    pub body: Rc<BlockStatement>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let parameters: Vec<String> = self.parameters.iter().map(Parameter::to_string).collect();

        let preamble = match &self.name {
            Some(name) => format!("fn {}", name),
            None => "fn".to_owned(),
        };

        write!(f, "{}({}) {}", preamble, parameters.join(", "), self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallArgument {
    pub name: Option<String>,
    pub value: Expression,
}

impl Display for CallArgument {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} = {}", name, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

impl From<Expression> for CallArgument {
    fn from(value: Expression) -> Self {
        Self { name: None, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub function: Box<Expression>,
    pub arguments: Vec<CallArgument>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let arguments: Vec<String> = self.arguments.iter().map(CallArgument::to_string).collect();

        write!(f, "{}({})", self.function, arguments.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(Expression::to_string).collect();

        write!(f, "[{}]", elements.join(", "))
    }
}

impl From<Vec<Expression>> for ArrayLiteral {
    fn from(elements: Vec<Expression>) -> Self {
        Self { elements }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLiteral {
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for MapLiteral {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

impl From<Vec<(Expression, Expression)>> for MapLiteral {
    fn from(pairs: Vec<(Expression, Expression)>) -> Self {
        Self { pairs }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeLiteral {
    pub start: Box<Expression>,
    pub end: Box<Expression>,
}

impl Display for RangeLiteral {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({}..{})", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipeExpression {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl Display for PipeExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({} |> {})", self.left, self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpression {
    pub target: Box<Expression>,
    pub value: Box<Expression>,
}

impl Display for AssignExpression {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "({} = {})", self.target, self.value)
    }
}
