use crate::ast;
use custom_error::custom_error;

custom_error! {
    #[derive(Clone, PartialEq)]
    pub EvalError

    IdentifierNotFound{id: String} = "undefined variable: {id}",
    UnknownPrefixOperator{operator: ast::Operator, operand: &'static str} = "unknown operator: {operator}{operand}",
    UnknownInfixOperator{left: &'static str, operator: ast::Operator, right: &'static str} = "unknown operator: {left} {operator} {right}",
    DivisionByZero = "division by zero",
    NotAFunction{type_name: &'static str} = "not a function: {type_name}",
    NotIndexable{left: &'static str, index: &'static str} = "index operator not supported: {left}[{index}]",
    NotHashable{type_name: &'static str} = "unusable as map key: {type_name}",
    IndexOutOfBounds{index: i64} = "array index out of bounds: {index}",
    NotIndexAssignable{type_name: &'static str} = "cannot assign to index of {type_name}",
    InvalidAssignTarget = "cannot assign to this expression",
    InvalidPipeTarget = "right side of pipe must be a function call",
    NotIterable{type_name: &'static str} = "cannot iterate over {type_name}",
    RangeBound{bound: &'static str, type_name: &'static str} = "range {bound} must be an integer, got {type_name}",
    InvalidRegex{message: String} = "invalid regex pattern: {message}",
    IncorrectArity{name: &'static str, want: String, got: usize} = "{name}() takes {want}, got {got}",
    UnsupportedArgType{name: &'static str, want: &'static str, got: &'static str} = "{name}() expected {want}, got {got}",
    ConversionFailed{value: String, target: &'static str} = "cannot convert {value} to {target}",
    NegativeCount{name: &'static str, count: i64} = "{name}() count must not be negative, got {count}",
    OutputFailed{message: String} = "cannot write output: {message}",
    ResultTooLarge{name: &'static str} = "{name}() result is too large",
}

impl EvalError {
    pub fn arg_type(name: &'static str, want: &'static str, got: &'static str) -> Self {
        Self::UnsupportedArgType { name, want, got }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        let cases = vec![
            (
                EvalError::IdentifierNotFound {
                    id: "foo".to_owned(),
                },
                "undefined variable: foo",
            ),
            (
                EvalError::UnknownPrefixOperator {
                    operator: ast::Operator::Minus,
                    operand: "STRING",
                },
                "unknown operator: -STRING",
            ),
            (
                EvalError::UnknownInfixOperator {
                    left: "INTEGER",
                    operator: ast::Operator::Plus,
                    right: "STRING",
                },
                "unknown operator: INTEGER + STRING",
            ),
            (EvalError::DivisionByZero, "division by zero"),
            (
                EvalError::IncorrectArity {
                    name: "len",
                    want: "1 argument".to_owned(),
                    got: 2,
                },
                "len() takes 1 argument, got 2",
            ),
            (
                EvalError::arg_type("upper", "a string", "INTEGER"),
                "upper() expected a string, got INTEGER",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
        }
    }
}
