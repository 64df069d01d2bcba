use crate::ast;
use crate::builtins::Builtin;
use crate::environment::Environment;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::iter::FromIterator;
use std::rc::Rc;

mod eval_error;
pub use eval_error::EvalError;

mod hash;
pub use hash::HashKey;

pub type Result<T> = std::result::Result<T, EvalError>;

pub type ArrayRef = Rc<RefCell<Vec<Object>>>;
pub type MapRef = Rc<RefCell<HashValue>>;

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
    Array(ArrayRef),
    Map(MapRef),
    Range(i64, i64),
    Regex(Rc<RegexValue>),
    Function(Rc<FunctionObject>),
    Builtin(Builtin),
    ReturnValue(Box<Object>),
    Error(String),
}

impl Display for Object {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => write!(f, "null"),
            Self::Array(a) => {
                let elements: Vec<String> = a.borrow().iter().map(Object::to_string).collect();

                write!(f, "[{}]", elements.join(", "))
            }
            Self::Map(h) => write!(f, "{}", h.borrow()),
            Self::Range(start, end) => write!(f, "{}..{}", start, end),
            Self::Regex(re) => write!(f, "/{}/", re.pattern),
            Self::Function(func) => write!(f, "{}", func),
            Self::Builtin(_) => write!(f, "builtin function"),
            Self::ReturnValue(obj) => write!(f, "{}", obj),
            Self::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

/// Structural equality, used by tests and by the collection builtins.
///
/// The language's own `==` is stricter for reference types; see the evaluator.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Map(a), Self::Map(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Self::Range(a1, a2), Self::Range(b1, b2)) => a1 == b1 && a2 == b2,
            (Self::Regex(a), Self::Regex(b)) => a.pattern == b.pattern,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a.name == b.name,
            (Self::ReturnValue(a), Self::ReturnValue(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::Null
    }
}

impl From<i64> for Object {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Object {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<String> for Object {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        s.to_owned().into()
    }
}

impl From<Vec<Object>> for Object {
    fn from(a: Vec<Object>) -> Self {
        Self::Array(Rc::new(RefCell::new(a)))
    }
}

impl From<HashValue> for Object {
    fn from(h: HashValue) -> Self {
        Self::Map(Rc::new(RefCell::new(h)))
    }
}

impl From<FunctionObject> for Object {
    fn from(func: FunctionObject) -> Self {
        Self::Function(Rc::new(func))
    }
}

impl From<RegexValue> for Object {
    fn from(re: RegexValue) -> Self {
        Self::Regex(Rc::new(re))
    }
}

impl Object {
    pub fn is_return_value(&self) -> bool {
        matches!(self, Self::ReturnValue(_))
    }

    pub fn unwrap_return(self) -> Self {
        match self {
            Self::ReturnValue(o) => *o,
            obj => obj,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::String(_) => "STRING",
            Self::Boolean(_) => "BOOLEAN",
            Self::Null => "NULL",
            Self::Array(_) => "ARRAY",
            Self::Map(_) => "MAP",
            Self::Range(_, _) => "RANGE",
            Self::Regex(_) => "REGEX",
            Self::Function(_) => "FUNCTION",
            Self::Builtin(_) => "BUILTIN",
            Self::ReturnValue(_) => "RETURN_VALUE",
            Self::Error(_) => "ERROR",
        }
    }

    pub fn truth_value(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::String(s) => !s.is_empty(),
            Self::Array(a) => !a.borrow().is_empty(),
            _ => true,
        }
    }
}

#[derive(Debug)]
pub struct RegexValue {
    pub pattern: String,
    pub regex: regex::Regex,
}

impl RegexValue {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = regex::Regex::new(pattern).map_err(|err| EvalError::InvalidRegex {
            message: err.to_string(),
        })?;

        Ok(Self {
            pattern: pattern.to_owned(),
            regex,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FunctionObject {
    pub name: Option<String>,
    pub parameters: Rc<Vec<ast::Parameter>>,
    pub body: Rc<ast::BlockStatement>,
    pub env: Environment,
}

impl Display for FunctionObject {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let parameters: Vec<String> = self
            .parameters
            .iter()
            .map(ast::Parameter::to_string)
            .collect();

        match &self.name {
            Some(name) => write!(f, "fn {}({}) {}", name, parameters.join(", "), self.body),
            None => write!(f, "fn({}) {}", parameters.join(", "), self.body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashValue {
    pub values: HashMap<HashKey, Object>,
}

impl FromIterator<(HashKey, Object)> for HashValue {
    fn from_iter<I: IntoIterator<Item = (HashKey, Object)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Display for HashValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let pairs: Vec<String> = self
            .values
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}
