use super::{array_arg, check_arity, integer_arg, string_arg, Evaluator};
use crate::object::*;
use std::cmp::Ordering;
use std::collections::HashSet;

fn map_arg(name: &'static str, obj: &Object) -> Result<MapRef> {
    match obj {
        Object::Map(map) => Ok(map.clone()),
        other => Err(EvalError::arg_type(name, "a map", other.type_name())),
    }
}

pub fn contains(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("contains", &args, 2, 2)?;

    match &args[0] {
        Object::String(s) => {
            let needle = string_arg("contains", &args[1])?;
            Ok(s.contains(needle).into())
        }
        Object::Array(elements) => Ok(elements.borrow().contains(&args[1]).into()),
        other => Err(EvalError::arg_type(
            "contains",
            "a string or array",
            other.type_name(),
        )),
    }
}

pub fn find(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("find", &args, 2, 2)?;

    let index = match &args[0] {
        Object::String(s) => {
            let needle = string_arg("find", &args[1])?;
            s.find(needle).map(|byte| s[..byte].chars().count())
        }
        Object::Array(elements) => elements.borrow().iter().position(|el| *el == args[1]),
        other => {
            return Err(EvalError::arg_type(
                "find",
                "a string or array",
                other.type_name(),
            ))
        }
    };

    Ok(Object::Integer(index.map_or(-1, |i| i as i64)))
}

pub fn push(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("push", &args, 2, 2)?;

    let elements = array_arg("push", &args[0])?;
    elements.borrow_mut().push(args[1].clone());

    Ok(Object::Array(elements))
}

pub fn pop(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("pop", &args, 1, 1)?;

    let elements = array_arg("pop", &args[0])?;
    let last = elements.borrow_mut().pop();

    Ok(last.unwrap_or_default())
}

pub fn shift(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("shift", &args, 1, 1)?;

    let elements = array_arg("shift", &args[0])?;
    let mut elements = elements.borrow_mut();
    if elements.is_empty() {
        return Ok(Object::Null);
    }

    Ok(elements.remove(0))
}

pub fn unshift(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("unshift", &args, 2, 2)?;

    let elements = array_arg("unshift", &args[0])?;
    elements.borrow_mut().insert(0, args[1].clone());

    Ok(Object::Array(elements))
}

pub fn slice(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("slice", &args, 2, 3)?;

    let elements = array_arg("slice", &args[0])?;
    let elements = elements.borrow();
    let len = elements.len() as i64;

    let resolve = |index: i64| {
        let index = if index < 0 { len + index } else { index };
        index.max(0).min(len) as usize
    };

    let start = resolve(integer_arg("slice", &args[1])?);
    let end = match args.get(2) {
        Some(end) => resolve(integer_arg("slice", end)?),
        None => len as usize,
    };

    if start >= end {
        return Ok(Vec::new().into());
    }

    Ok(elements[start..end].to_vec().into())
}

fn compare(a: &Object, b: &Object) -> Ordering {
    match (a, b) {
        (Object::Integer(x), Object::Integer(y)) => x.cmp(y),
        (Object::Integer(x), Object::Float(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Object::Float(x), Object::Integer(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Object::Float(x), Object::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Object::String(x), Object::String(y)) => x.cmp(y),
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

pub fn sort(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("sort", &args, 1, 1)?;

    let mut sorted = array_arg("sort", &args[0])?.borrow().clone();

    let numeric = sorted
        .iter()
        .all(|el| matches!(el, Object::Integer(_) | Object::Float(_)));
    let textual = sorted.iter().all(|el| matches!(el, Object::String(_)));

    if numeric || textual {
        sorted.sort_by(compare);
    } else {
        sorted.sort_by_key(Object::to_string);
    }

    Ok(sorted.into())
}

pub fn unique(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("unique", &args, 1, 1)?;

    let elements = array_arg("unique", &args[0])?;
    let mut seen = HashSet::new();

    let unique: Vec<Object> = elements
        .borrow()
        .iter()
        .filter(|el| seen.insert((el.type_name(), el.to_string())))
        .cloned()
        .collect();

    Ok(unique.into())
}

fn flatten_into(elements: &[Object], out: &mut Vec<Object>) {
    for el in elements {
        match el {
            Object::Array(inner) => flatten_into(&inner.borrow(), out),
            other => out.push(other.clone()),
        }
    }
}

pub fn flatten(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("flatten", &args, 1, 1)?;

    let elements = array_arg("flatten", &args[0])?;
    let mut flat = Vec::new();
    flatten_into(&elements.borrow(), &mut flat);

    Ok(flat.into())
}

pub fn keys(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("keys", &args, 1, 1)?;

    let map = map_arg("keys", &args[0])?;
    let keys: Vec<Object> = map.borrow().values.keys().cloned().map(Object::from).collect();

    Ok(keys.into())
}

pub fn values(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("values", &args, 1, 1)?;

    let map = map_arg("values", &args[0])?;
    let values: Vec<Object> = map.borrow().values.values().cloned().collect();

    Ok(values.into())
}

pub fn range(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("range", &args, 1, 2)?;

    let (start, end) = match args.get(1) {
        Some(end) => (integer_arg("range", &args[0])?, integer_arg("range", end)?),
        None => (0, integer_arg("range", &args[0])?),
    };

    Ok(Object::Range(start, end))
}
