use crate::ast::BlockStatement;
use crate::environment::Environment;
use crate::object::*;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

mod arrays;
mod functional;
mod patterns;
mod strings;

/// The hooks a builtin may need from the running interpreter.
///
/// The registry only ever sees this trait, so the evaluator can depend on the
/// registry without the registry depending back on the evaluator.
pub trait Evaluator {
    fn eval_block(&self, block: &BlockStatement, env: &Environment) -> Result<Object>;

    fn write_output(&self, text: &str) -> Result<()>;
}

pub type BuiltinFn = fn(&dyn Evaluator, Vec<Object>) -> Result<Object>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    const fn new(name: &'static str, func: BuiltinFn) -> Self {
        Self { name, func }
    }

    pub fn call(&self, evaluator: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
        (self.func)(evaluator, args)
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

pub fn lookup(name: &str) -> Option<Object> {
    BUILTINS.get(name).map(|builtin| Object::Builtin(*builtin))
}

fn check_arity(name: &'static str, args: &[Object], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }

    let want = match (min, max) {
        (1, 1) => "1 argument".to_owned(),
        (min, max) if min == max => format!("{} arguments", min),
        (min, max) => format!("{}-{} arguments", min, max),
    };

    Err(EvalError::IncorrectArity {
        name,
        want,
        got: args.len(),
    })
}

fn string_arg<'a>(name: &'static str, obj: &'a Object) -> Result<&'a str> {
    match obj {
        Object::String(s) => Ok(s),
        other => Err(EvalError::arg_type(name, "a string", other.type_name())),
    }
}

fn integer_arg(name: &'static str, obj: &Object) -> Result<i64> {
    match obj {
        Object::Integer(n) => Ok(*n),
        other => Err(EvalError::arg_type(name, "an integer", other.type_name())),
    }
}

fn array_arg(name: &'static str, obj: &Object) -> Result<ArrayRef> {
    match obj {
        Object::Array(elements) => Ok(elements.clone()),
        other => Err(EvalError::arg_type(name, "an array", other.type_name())),
    }
}

fn print(evaluator: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    let mut line: String = args.iter().map(Object::to_string).collect();
    line.push('\n');
    evaluator.write_output(&line)?;

    Ok(Object::Null)
}

fn type_of(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("type", &args, 1, 1)?;

    Ok(args[0].type_name().into())
}

fn len(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("len", &args, 1, 1)?;

    let length = match &args[0] {
        Object::String(s) => s.chars().count(),
        Object::Array(elements) => elements.borrow().len(),
        Object::Map(map) => map.borrow().values.len(),
        other => {
            return Err(EvalError::arg_type(
                "len",
                "a string, array or map",
                other.type_name(),
            ))
        }
    };

    Ok(Object::Integer(length as i64))
}

fn int(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("int", &args, 1, 1)?;

    match &args[0] {
        Object::Integer(n) => Ok(Object::Integer(*n)),
        Object::Float(f) => Ok(Object::Integer(*f as i64)),
        Object::Boolean(b) => Ok(Object::Integer(*b as i64)),
        Object::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Object::Integer)
            .map_err(|_| EvalError::ConversionFailed {
                value: format!("{:?}", s),
                target: "int",
            }),
        other => Err(EvalError::ConversionFailed {
            value: other.type_name().to_owned(),
            target: "int",
        }),
    }
}

fn float(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("float", &args, 1, 1)?;

    match &args[0] {
        Object::Float(f) => Ok(Object::Float(*f)),
        Object::Integer(n) => Ok(Object::Float(*n as f64)),
        Object::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Object::Float)
            .map_err(|_| EvalError::ConversionFailed {
                value: format!("{:?}", s),
                target: "float",
            }),
        other => Err(EvalError::ConversionFailed {
            value: other.type_name().to_owned(),
            target: "float",
        }),
    }
}

fn stringify(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("str", &args, 1, 1)?;

    Ok(args[0].to_string().into())
}

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let table = [
            Builtin::new("print", print),
            Builtin::new("type", type_of),
            Builtin::new("len", len),
            Builtin::new("int", int),
            Builtin::new("float", float),
            Builtin::new("str", stringify),
            Builtin::new("upper", strings::upper),
            Builtin::new("lower", strings::lower),
            Builtin::new("trim", strings::trim),
            Builtin::new("ltrim", strings::ltrim),
            Builtin::new("rtrim", strings::rtrim),
            Builtin::new("split", strings::split),
            Builtin::new("join", strings::join),
            Builtin::new("replace", strings::replace),
            Builtin::new("replace_all", strings::replace_all),
            Builtin::new("starts_with", strings::starts_with),
            Builtin::new("ends_with", strings::ends_with),
            Builtin::new("substr", strings::substr),
            Builtin::new("repeat", strings::repeat),
            Builtin::new("reverse", strings::reverse),
            Builtin::new("lines", strings::lines),
            Builtin::new("chars", strings::chars),
            Builtin::new("match", patterns::match_first),
            Builtin::new("match_all", patterns::match_all),
            Builtin::new("regex", patterns::regex),
            Builtin::new("contains", arrays::contains),
            Builtin::new("find", arrays::find),
            Builtin::new("push", arrays::push),
            Builtin::new("pop", arrays::pop),
            Builtin::new("shift", arrays::shift),
            Builtin::new("unshift", arrays::unshift),
            Builtin::new("slice", arrays::slice),
            Builtin::new("sort", arrays::sort),
            Builtin::new("unique", arrays::unique),
            Builtin::new("flatten", arrays::flatten),
            Builtin::new("keys", arrays::keys),
            Builtin::new("values", arrays::values),
            Builtin::new("range", arrays::range),
            Builtin::new("map", functional::map),
            Builtin::new("filter", functional::filter),
            Builtin::new("reduce", functional::reduce),
        ];

        table
            .into_iter()
            .map(|builtin| (builtin.name, builtin))
            .collect()
    };
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::cell::RefCell;

    /// Stands in for the interpreter: records output, cannot run blocks.
    #[derive(Default)]
    pub struct Recorder {
        pub output: RefCell<String>,
    }

    impl Evaluator for Recorder {
        fn eval_block(&self, _: &BlockStatement, _: &Environment) -> Result<Object> {
            Ok(Object::Null)
        }

        fn write_output(&self, text: &str) -> Result<()> {
            self.output.borrow_mut().push_str(text);
            Ok(())
        }
    }

    pub fn call(name: &str, args: Vec<Object>) -> Result<Object> {
        match lookup(name) {
            Some(Object::Builtin(builtin)) => builtin.call(&Recorder::default(), args),
            _ => panic!("no builtin named {}", name),
        }
    }

    pub fn call_err(name: &str, args: Vec<Object>) -> String {
        match call(name, args) {
            Err(err) => err.to_string(),
            Ok(obj) => panic!("{}() succeeded with {}", name, obj),
        }
    }

    #[test]
    fn test_registry() {
        let names = [
            "print", "type", "len", "upper", "lower", "trim", "ltrim", "rtrim", "split", "join",
            "replace", "replace_all", "contains", "starts_with", "ends_with", "substr", "repeat",
            "reverse", "lines", "chars", "match", "match_all", "regex", "push", "pop", "shift",
            "unshift", "slice", "sort", "unique", "flatten", "map", "filter", "reduce", "keys",
            "values", "int", "float", "str", "find", "range",
        ];

        for name in names.iter() {
            match lookup(name) {
                Some(Object::Builtin(builtin)) => assert_eq!(builtin.name, *name),
                other => panic!("{} resolved to {:?}", name, other),
            }
        }
        assert_eq!(BUILTINS.len(), names.len());
        assert!(lookup("nope").is_none());
    }

    #[test]
    fn test_print() {
        let recorder = Recorder::default();
        let result = print(&recorder, vec!["a".into(), 1.into(), Object::Null]);

        assert_eq!(result, Ok(Object::Null));
        assert_eq!(*recorder.output.borrow(), "a1null\n");
    }

    #[test]
    fn test_len_and_type() {
        assert_eq!(call("len", vec!["héllo".into()]), Ok(5.into()));
        assert_eq!(
            call("len", vec![vec![1.into(), 2.into()].into()]),
            Ok(2.into())
        );
        assert_eq!(call("type", vec![1.5.into()]), Ok("FLOAT".into()));
        assert_eq!(
            call_err("len", vec![1.into()]),
            "len() expected a string, array or map, got INTEGER"
        );
        assert_eq!(call_err("len", vec![]), "len() takes 1 argument, got 0");
    }

    #[test]
    fn test_conversions() {
        let cases: Vec<(&str, Object, Object)> = vec![
            ("int", 3.9.into(), 3.into()),
            ("int", "42".into(), 42.into()),
            ("int", true.into(), 1.into()),
            ("float", 2.into(), 2.0.into()),
            ("float", " 2.5 ".into(), 2.5.into()),
            ("str", vec![1.into()].into(), "[1]".into()),
        ];

        for (name, input, expected) in cases {
            assert_eq!(call(name, vec![input]), Ok(expected));
        }

        assert_eq!(
            call_err("int", vec!["abc".into()]),
            "cannot convert \"abc\" to int"
        );
        assert_eq!(
            call_err("float", vec![Object::Null]),
            "cannot convert NULL to float"
        );
    }
}
