use super::{array_arg, check_arity, Evaluator};
use crate::environment::Environment;
use crate::object::*;

fn callback_arg(name: &'static str, obj: &Object) -> Result<Object> {
    match obj {
        Object::Function(_) | Object::Builtin(_) => Ok(obj.clone()),
        other => Err(EvalError::arg_type(name, "a function", other.type_name())),
    }
}

/// Runs a callback with `args` bound positionally to its leading parameters.
///
/// Parameters past the supplied arguments stay unbound; defaults are not
/// consulted here.
fn invoke(evaluator: &dyn Evaluator, callback: &Object, args: Vec<Object>) -> Result<Object> {
    match callback {
        Object::Function(func) => {
            let env = Environment::enclosed(&func.env);
            for (param, arg) in func.parameters.iter().zip(args) {
                env.set(&param.name.value, arg);
            }

            Ok(evaluator.eval_block(&func.body, &env)?.unwrap_return())
        }
        Object::Builtin(builtin) => builtin.call(evaluator, args),
        other => Err(EvalError::NotAFunction {
            type_name: other.type_name(),
        }),
    }
}

/// User functions see the element and its index; builtins only the element.
fn element_args(callback: &Object, el: Object, index: usize) -> Vec<Object> {
    match callback {
        Object::Function(_) => vec![el, Object::Integer(index as i64)],
        _ => vec![el],
    }
}

pub fn map(evaluator: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("map", &args, 2, 2)?;

    let elements = array_arg("map", &args[0])?.borrow().clone();
    let callback = callback_arg("map", &args[1])?;

    let mapped = elements
        .into_iter()
        .enumerate()
        .map(|(i, el)| invoke(evaluator, &callback, element_args(&callback, el, i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(mapped.into())
}

pub fn filter(evaluator: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("filter", &args, 2, 2)?;

    let elements = array_arg("filter", &args[0])?.borrow().clone();
    let callback = callback_arg("filter", &args[1])?;

    let mut kept = Vec::new();
    for (i, el) in elements.into_iter().enumerate() {
        let keep = invoke(evaluator, &callback, element_args(&callback, el.clone(), i))?;
        if keep.truth_value() {
            kept.push(el);
        }
    }

    Ok(kept.into())
}

pub fn reduce(evaluator: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("reduce", &args, 3, 3)?;

    let elements = array_arg("reduce", &args[0])?.borrow().clone();
    let callback = callback_arg("reduce", &args[1])?;

    elements
        .into_iter()
        .try_fold(args[2].clone(), |acc, el| {
            invoke(evaluator, &callback, vec![acc, el])
        })
}
