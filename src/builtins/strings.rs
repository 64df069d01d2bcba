use super::{check_arity, integer_arg, string_arg, Evaluator};
use crate::object::*;

const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r'];

fn map_string(name: &'static str, args: Vec<Object>, f: fn(&str) -> String) -> Result<Object> {
    check_arity(name, &args, 1, 1)?;

    Ok(f(string_arg(name, &args[0])?).into())
}

fn string_array<'a>(parts: impl Iterator<Item = &'a str>) -> Object {
    parts.map(Object::from).collect::<Vec<_>>().into()
}

pub fn upper(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    map_string("upper", args, str::to_uppercase)
}

pub fn lower(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    map_string("lower", args, str::to_lowercase)
}

pub fn trim(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    map_string("trim", args, |s| s.trim().to_owned())
}

pub fn ltrim(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    map_string("ltrim", args, |s| s.trim_start_matches(TRIM_CHARS).to_owned())
}

pub fn rtrim(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    map_string("rtrim", args, |s| s.trim_end_matches(TRIM_CHARS).to_owned())
}

pub fn split(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("split", &args, 1, 2)?;

    let s = string_arg("split", &args[0])?;
    let separator = match args.get(1) {
        Some(sep) => string_arg("split", sep)?,
        None => " ",
    };

    if separator.is_empty() {
        let chars: Vec<Object> = s.chars().map(|c| c.to_string().into()).collect();
        return Ok(chars.into());
    }

    Ok(string_array(s.split(separator)))
}

pub fn join(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("join", &args, 1, 2)?;

    let elements = super::array_arg("join", &args[0])?;
    let separator = match args.get(1) {
        Some(sep) => string_arg("join", sep)?,
        None => "",
    };

    let parts: Vec<String> = elements.borrow().iter().map(Object::to_string).collect();

    Ok(parts.join(separator).into())
}

/// Shared by `replace` and `replace_all`; `limit` is the number of
/// replacements, zero meaning all of them.
fn replace_n(name: &'static str, args: Vec<Object>, limit: usize) -> Result<Object> {
    check_arity(name, &args, 3, 3)?;

    let s = string_arg(name, &args[0])?;
    let replacement = string_arg(name, &args[2])?;

    let replaced = match &args[1] {
        Object::String(old) if limit == 0 => s.replace(old.as_str(), replacement),
        Object::String(old) => s.replacen(old.as_str(), replacement, limit),
        Object::Regex(re) => re.regex.replacen(s, limit, replacement).into_owned(),
        other => {
            return Err(EvalError::arg_type(
                name,
                "a string or regex",
                other.type_name(),
            ))
        }
    };

    Ok(replaced.into())
}

pub fn replace(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    replace_n("replace", args, 1)
}

pub fn replace_all(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    replace_n("replace_all", args, 0)
}

pub fn starts_with(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("starts_with", &args, 2, 2)?;

    let s = string_arg("starts_with", &args[0])?;
    let prefix = string_arg("starts_with", &args[1])?;

    Ok(s.starts_with(prefix).into())
}

pub fn ends_with(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("ends_with", &args, 2, 2)?;

    let s = string_arg("ends_with", &args[0])?;
    let suffix = string_arg("ends_with", &args[1])?;

    Ok(s.ends_with(suffix).into())
}

pub fn substr(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("substr", &args, 2, 3)?;

    let chars: Vec<char> = string_arg("substr", &args[0])?.chars().collect();
    let len = chars.len() as i64;

    let mut start = integer_arg("substr", &args[1])?;
    if start < 0 {
        start = (len + start).max(0);
    }
    if start >= len {
        return Ok("".into());
    }

    let end = match args.get(2) {
        Some(length) => {
            let length = integer_arg("substr", length)?;
            if length < 0 {
                return Err(EvalError::NegativeCount {
                    name: "substr",
                    count: length,
                });
            }
            start.saturating_add(length).min(len)
        }
        None => len,
    };

    Ok(chars[start as usize..end as usize]
        .iter()
        .collect::<String>()
        .into())
}

pub fn repeat(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("repeat", &args, 2, 2)?;

    let s = string_arg("repeat", &args[0])?;
    let count = integer_arg("repeat", &args[1])?;
    if count < 0 {
        return Err(EvalError::NegativeCount {
            name: "repeat",
            count,
        });
    }

    match s.len().checked_mul(count as usize) {
        Some(size) if size <= isize::MAX as usize => Ok(s.repeat(count as usize).into()),
        _ => Err(EvalError::ResultTooLarge { name: "repeat" }),
    }
}

pub fn reverse(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("reverse", &args, 1, 1)?;

    match &args[0] {
        Object::String(s) => Ok(s.chars().rev().collect::<String>().into()),
        Object::Array(elements) => {
            let reversed: Vec<Object> = elements.borrow().iter().rev().cloned().collect();
            Ok(reversed.into())
        }
        other => Err(EvalError::arg_type(
            "reverse",
            "a string or array",
            other.type_name(),
        )),
    }
}

pub fn lines(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("lines", &args, 1, 1)?;

    Ok(string_array(string_arg("lines", &args[0])?.split('\n')))
}

pub fn chars(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("chars", &args, 1, 1)?;

    let chars: Vec<Object> = string_arg("chars", &args[0])?
        .chars()
        .map(|c| c.to_string().into())
        .collect();

    Ok(chars.into())
}
