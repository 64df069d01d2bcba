use crate::ast::{self, Expression, Operator, Statement};
use crate::builtins::{self, Evaluator};
use crate::environment::Environment;
use crate::object::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use tracing::{debug, trace};


/// Evaluates `program` against `env`, writing `print` output to stdout.
pub fn evaluate(program: &ast::Program, env: &Environment) -> Object {
    Interpreter::default().evaluate(program, env)
}

/// A call-site argument after evaluation.
struct Argument<'a> {
    name: Option<&'a str>,
    value: Object,
}

impl From<Object> for Argument<'_> {
    fn from(value: Object) -> Self {
        Self { name: None, value }
    }
}

pub struct Interpreter {
    output: Rc<RefCell<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Rc::new(RefCell::new(std::io::stdout())))
    }
}

impl Evaluator for Interpreter {
    fn eval_block(&self, block: &ast::BlockStatement, env: &Environment) -> Result<Object> {
        self.eval_block_statement(block, env)
    }

    fn write_output(&self, text: &str) -> Result<()> {
        let mut output = self.output.borrow_mut();
        output
            .write_all(text.as_bytes())
            .and_then(|_| output.flush())
            .map_err(|err| EvalError::OutputFailed {
                message: err.to_string(),
            })
    }
}

impl Interpreter {
    pub fn new(output: Rc<RefCell<dyn Write>>) -> Self {
        Self { output }
    }

    /// Runs a whole program. Runtime errors come back as `Object::Error`.
    pub fn evaluate(&self, program: &ast::Program, env: &Environment) -> Object {
        debug!(statements = program.statements.len(), "evaluating program");

        match self.eval_program(program, env) {
            Ok(obj) => obj,
            Err(err) => {
                debug!(error = %err, "evaluation failed");
                Object::Error(err.to_string())
            }
        }
    }

    fn eval_program(&self, program: &ast::Program, env: &Environment) -> Result<Object> {
        let mut result = Object::Null;

        for stmt in program.statements.iter() {
            result = self.eval_statement(stmt, env)?;
            if result.is_return_value() {
                return Ok(result.unwrap_return());
            }
        }

        Ok(result)
    }

    fn eval_block_statement(&self, block: &ast::BlockStatement, env: &Environment) -> Result<Object> {
        let mut result = Object::Null;

        for stmt in block.statements.iter() {
            result = self.eval_statement(stmt, env)?;
            if result.is_return_value() {
                break;
            }
        }

        Ok(result)
    }

    fn eval_statement(&self, stmt: &Statement, env: &Environment) -> Result<Object> {
        match stmt {
            Statement::Let(stmt) => {
                let value = self.eval_expression(&stmt.value, env)?;
                env.set(&stmt.name.value, value.clone());
                Ok(value)
            }
            Statement::Return(stmt) => {
                let value = match &stmt.return_value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Object::Null,
                };
                Ok(Object::ReturnValue(Box::new(value)))
            }
            Statement::Expr(stmt) => self.eval_expression(&stmt.expression, env),
            Statement::For(stmt) => self.eval_for_statement(stmt, env),
            Statement::While(stmt) => self.eval_while_statement(stmt, env),
        }
    }

    fn eval_for_statement(&self, stmt: &ast::ForStatement, env: &Environment) -> Result<Object> {
        let iterable = self.eval_expression(&stmt.iterable, env)?;

        let items: Box<dyn Iterator<Item = Object> + '_> = match &iterable {
            Object::Array(elements) => Box::new(elements.borrow().clone().into_iter()),
            Object::Range(start, end) => Box::new((*start..*end).map(Object::Integer)),
            Object::String(s) => Box::new(s.chars().map(|c| Object::String(c.to_string()))),
            Object::Map(map) => {
                let keys: Vec<Object> = map.borrow().values.keys().cloned().map(Object::from).collect();
                Box::new(keys.into_iter())
            }
            other => {
                return Err(EvalError::NotIterable {
                    type_name: other.type_name(),
                })
            }
        };

        let mut result = Object::Null;
        for item in items {
            let scope = Environment::enclosed(env);
            scope.set(&stmt.variable.value, item);

            result = self.eval_block_statement(&stmt.body, &scope)?;
            if result.is_return_value() {
                break;
            }
        }

        Ok(result)
    }

    fn eval_while_statement(&self, stmt: &ast::WhileStatement, env: &Environment) -> Result<Object> {
        let mut result = Object::Null;

        while self.eval_expression(&stmt.condition, env)?.truth_value() {
            result = self.eval_block_statement(&stmt.body, env)?;
            if result.is_return_value() {
                break;
            }
        }

        Ok(result)
    }

    fn eval_expression(&self, expr: &Expression, env: &Environment) -> Result<Object> {
        match expr {
            Expression::Identifier(id) => eval_identifier(&id.value, env),
            Expression::IntegerLiteral(n) => Ok(Object::Integer(*n)),
            Expression::FloatLiteral(n) => Ok(Object::Float(*n)),
            Expression::String(lit) => self.eval_string_literal(lit, env),
            Expression::Boolean(b) => Ok(Object::Boolean(*b)),
            Expression::Null => Ok(Object::Null),
            Expression::Regex(pattern) => Ok(RegexValue::new(pattern)?.into()),
            Expression::Array(lit) => {
                let elements = lit
                    .elements
                    .iter()
                    .map(|el| self.eval_expression(el, env))
                    .collect::<Result<Vec<_>>>()?;
                Ok(elements.into())
            }
            Expression::Map(lit) => self.eval_map_literal(lit, env),
            Expression::Range(lit) => {
                let start = self.eval_expression(&lit.start, env)?;
                let end = self.eval_expression(&lit.end, env)?;
                Ok(Object::Range(range_bound("start", &start)?, range_bound("end", &end)?))
            }
            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right, env)?;
                eval_prefix_expression(prefix.operator, right)
            }
            Expression::Infix(infix) => self.eval_infix(infix, env),
            Expression::If(expr) => self.eval_if_expression(expr, env),
            Expression::Function(func) => Ok(eval_function_literal(func, env)),
            Expression::Call(call) => {
                let function = self.eval_expression(&call.function, env)?;
                let args = self.eval_call_arguments(&call.arguments, env)?;
                self.apply_function(function, args)
            }
            Expression::Index(index) => {
                let left = self.eval_expression(&index.left, env)?;
                let index = self.eval_expression(&index.index, env)?;
                eval_index_expression(&left, &index)
            }
            Expression::Pipe(pipe) => self.eval_pipe_expression(pipe, env),
            Expression::Assign(assign) => self.eval_assign_expression(assign, env),
        }
    }

    fn eval_string_literal(&self, lit: &ast::StringLiteral, env: &Environment) -> Result<Object> {
        let mut result = String::new();

        for part in lit.parts.iter() {
            match part {
                ast::StringPart::Text(text) => result.push_str(text),
                ast::StringPart::Expr(expr) => {
                    let value = self.eval_expression(expr, env)?;
                    result.push_str(&value.to_string());
                }
            }
        }

        Ok(result.into())
    }

    fn eval_map_literal(&self, lit: &ast::MapLiteral, env: &Environment) -> Result<Object> {
        let mut values = HashMap::new();

        for (key, value) in lit.pairs.iter() {
            let key = HashKey::try_from(self.eval_expression(key, env)?)?;
            let value = self.eval_expression(value, env)?;
            values.insert(key, value);
        }

        Ok(HashValue { values }.into())
    }

    fn eval_infix(&self, infix: &ast::InfixExpression, env: &Environment) -> Result<Object> {
        let left = self.eval_expression(&infix.left, env)?;

        match infix.operator {
            Operator::And if !left.truth_value() => Ok(left),
            Operator::Or if left.truth_value() => Ok(left),
            Operator::And | Operator::Or => self.eval_expression(&infix.right, env),
            operator => {
                let right = self.eval_expression(&infix.right, env)?;
                eval_infix_expression(operator, left, right)
            }
        }
    }

    fn eval_if_expression(&self, expr: &ast::IfExpression, env: &Environment) -> Result<Object> {
        let condition = self.eval_expression(&expr.condition, env)?;

        if condition.truth_value() {
            self.eval_block_statement(&expr.consequence, env)
        } else if let Some(alternative) = &expr.alternative {
            self.eval_block_statement(alternative, env)
        } else {
            Ok(Object::Null)
        }
    }

    fn eval_call_arguments<'a>(
        &self,
        arguments: &'a [ast::CallArgument],
        env: &Environment,
    ) -> Result<Vec<Argument<'a>>> {
        arguments
            .iter()
            .map(|arg| -> Result<Argument<'a>> {
                Ok(Argument {
                    name: arg.name.as_deref(),
                    value: self.eval_expression(&arg.value, env)?,
                })
            })
            .collect()
    }

    fn apply_function(&self, function: Object, args: Vec<Argument>) -> Result<Object> {
        match function {
            Object::Function(func) => {
                trace!(name = ?func.name, args = args.len(), "applying function");

                let scope = self.extend_function_env(&func, args)?;
                Ok(self.eval_block_statement(&func.body, &scope)?.unwrap_return())
            }
            Object::Builtin(builtin) => {
                trace!(name = builtin.name, args = args.len(), "applying builtin");

                let args = args.into_iter().map(|arg| arg.value).collect();
                builtin.call(self, args)
            }
            other => Err(EvalError::NotAFunction {
                type_name: other.type_name(),
            }),
        }
    }

    /// Binds each parameter, in declaration order, to a named argument, the
    /// next positional argument, its default, or null.
    fn extend_function_env(&self, func: &FunctionObject, args: Vec<Argument>) -> Result<Environment> {
        let scope = Environment::enclosed(&func.env);

        let mut named = HashMap::new();
        let mut positional = vec![];
        for arg in args {
            match arg.name {
                Some(name) => {
                    named.insert(name, arg.value);
                }
                None => positional.push(arg.value),
            }
        }
        let mut positional = positional.into_iter();

        for param in func.parameters.iter() {
            let name = param.name.value.as_str();

            let value = match named.remove(name).or_else(|| positional.next()) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => self.eval_expression(default, &func.env)?,
                    None => Object::Null,
                },
            };
            scope.set(name, value);
        }

        Ok(scope)
    }

    fn eval_pipe_expression(&self, pipe: &ast::PipeExpression, env: &Environment) -> Result<Object> {
        let left = self.eval_expression(&pipe.left, env)?;

        match pipe.right.as_ref() {
            Expression::Call(call) => {
                let function = self.eval_expression(&call.function, env)?;

                let mut args = vec![Argument::from(left)];
                args.extend(self.eval_call_arguments(&call.arguments, env)?);
                self.apply_function(function, args)
            }
            Expression::Identifier(id) => {
                let function = eval_identifier(&id.value, env)?;
                self.apply_function(function, vec![left.into()])
            }
            _ => Err(EvalError::InvalidPipeTarget),
        }
    }

    fn eval_assign_expression(&self, assign: &ast::AssignExpression, env: &Environment) -> Result<Object> {
        let value = self.eval_expression(&assign.value, env)?;

        match assign.target.as_ref() {
            Expression::Identifier(id) => {
                if env.update(&id.value, value.clone()) {
                    Ok(value)
                } else {
                    Err(EvalError::IdentifierNotFound {
                        id: id.value.clone(),
                    })
                }
            }
            Expression::Index(target) => {
                let left = self.eval_expression(&target.left, env)?;
                let index = self.eval_expression(&target.index, env)?;
                assign_index(&left, &index, value.clone())?;
                Ok(value)
            }
            _ => Err(EvalError::InvalidAssignTarget),
        }
    }
}

fn eval_identifier(name: &str, env: &Environment) -> Result<Object> {
    env.get(name)
        .or_else(|| builtins::lookup(name))
        .ok_or_else(|| EvalError::IdentifierNotFound {
            id: name.to_owned(),
        })
}

fn eval_function_literal(func: &ast::FunctionLiteral, env: &Environment) -> Object {
    let function: Object = FunctionObject {
        name: func.name.clone(),
        parameters: Rc::clone(&func.parameters),
        body: Rc::clone(&func.body),
        env: env.clone(),
    }
    .into();

    // The binding makes the scope and the function own each other.
    if let Some(name) = &func.name {
        env.set(name, function.clone());
    }

    function
}

fn range_bound(bound: &'static str, obj: &Object) -> Result<i64> {
    match obj {
        Object::Integer(n) => Ok(*n),
        other => Err(EvalError::RangeBound {
            bound,
            type_name: other.type_name(),
        }),
    }
}

fn eval_prefix_expression(operator: Operator, right: Object) -> Result<Object> {
    match (operator, &right) {
        (Operator::Bang | Operator::Not, _) => Ok(Object::Boolean(!right.truth_value())),
        (Operator::Minus, Object::Integer(n)) => Ok(Object::Integer(n.wrapping_neg())),
        (Operator::Minus, Object::Float(n)) => Ok(Object::Float(-n)),
        (operator, _) => Err(EvalError::UnknownPrefixOperator {
            operator,
            operand: right.type_name(),
        }),
    }
}

fn eval_infix_expression(operator: Operator, left: Object, right: Object) -> Result<Object> {
    let result = match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r)?,
        (Object::Integer(l), Object::Float(r)) => eval_float_infix_expression(operator, *l as f64, *r)?,
        (Object::Float(l), Object::Integer(r)) => eval_float_infix_expression(operator, *l, *r as f64)?,
        (Object::Float(l), Object::Float(r)) => eval_float_infix_expression(operator, *l, *r)?,
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operator, l, r),
        (Object::String(s), Object::Regex(re)) => match operator {
            Operator::Match => Some(re.regex.is_match(s).into()),
            Operator::NotMatch => Some((!re.regex.is_match(s)).into()),
            _ => None,
        },
        _ => match operator {
            Operator::Eq => Some(identical(&left, &right).into()),
            Operator::NotEq => Some((!identical(&left, &right)).into()),
            _ => None,
        },
    };

    result.ok_or_else(|| EvalError::UnknownInfixOperator {
        left: left.type_name(),
        operator,
        right: right.type_name(),
    })
}

fn eval_integer_infix_expression(operator: Operator, left: i64, right: i64) -> Result<Option<Object>> {
    let result = match operator {
        Operator::Plus => left.wrapping_add(right).into(),
        Operator::Minus => left.wrapping_sub(right).into(),
        Operator::Asterisk => left.wrapping_mul(right).into(),
        Operator::Slash | Operator::Percent if right == 0 => return Err(EvalError::DivisionByZero),
        Operator::Slash => left.wrapping_div(right).into(),
        Operator::Percent => left.wrapping_rem(right).into(),
        Operator::Lt => (left < right).into(),
        Operator::Gt => (left > right).into(),
        Operator::Lte => (left <= right).into(),
        Operator::Gte => (left >= right).into(),
        Operator::Eq => (left == right).into(),
        Operator::NotEq => (left != right).into(),
        _ => return Ok(None),
    };

    Ok(Some(result))
}

fn eval_float_infix_expression(operator: Operator, left: f64, right: f64) -> Result<Option<Object>> {
    let result = match operator {
        Operator::Plus => (left + right).into(),
        Operator::Minus => (left - right).into(),
        Operator::Asterisk => (left * right).into(),
        Operator::Slash | Operator::Percent if right == 0.0 => return Err(EvalError::DivisionByZero),
        Operator::Slash => (left / right).into(),
        Operator::Percent => (left % right).into(),
        Operator::Lt => (left < right).into(),
        Operator::Gt => (left > right).into(),
        Operator::Lte => (left <= right).into(),
        Operator::Gte => (left >= right).into(),
        Operator::Eq => (left == right).into(),
        Operator::NotEq => (left != right).into(),
        _ => return Ok(None),
    };

    Ok(Some(result))
}

fn eval_string_infix_expression(operator: Operator, left: &str, right: &str) -> Option<Object> {
    let result = match operator {
        Operator::Concat => [left, right].concat().into(),
        Operator::Lt => (left < right).into(),
        Operator::Gt => (left > right).into(),
        Operator::Lte => (left <= right).into(),
        Operator::Gte => (left >= right).into(),
        Operator::Eq => (left == right).into(),
        Operator::NotEq => (left != right).into(),
        _ => return None,
    };

    Some(result)
}

/// `==` for operands no typed comparison applies to: reference types compare
/// by identity, scalars by value, and mismatched types are never equal.
fn identical(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(a), Object::Boolean(b)) => a == b,
        (Object::Null, Object::Null) => true,
        (Object::Range(a1, a2), Object::Range(b1, b2)) => a1 == b1 && a2 == b2,
        (Object::Array(a), Object::Array(b)) => Rc::ptr_eq(a, b),
        (Object::Map(a), Object::Map(b)) => Rc::ptr_eq(a, b),
        (Object::Regex(a), Object::Regex(b)) => Rc::ptr_eq(a, b),
        (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
        (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
        _ => false,
    }
}

/// Resolves a possibly negative index against `len`.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { index.checked_add(len)? } else { index };

    if (0..len).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

fn eval_index_expression(left: &Object, index: &Object) -> Result<Object> {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => {
            let elements = elements.borrow();
            Ok(resolve_index(*i, elements.len()).map_or(Object::Null, |i| elements[i].clone()))
        }
        (Object::String(s), Object::Integer(i)) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(resolve_index(*i, chars.len()).map_or(Object::Null, |i| chars[i].to_string().into()))
        }
        (Object::Map(map), key) => {
            let key = HashKey::try_from(key)?;
            Ok(map.borrow().values.get(&key).cloned().unwrap_or_default())
        }
        _ => Err(EvalError::NotIndexable {
            left: left.type_name(),
            index: index.type_name(),
        }),
    }
}

fn assign_index(left: &Object, index: &Object, value: Object) -> Result<()> {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => {
            let mut elements = elements.borrow_mut();
            if *i < 0 || *i >= elements.len() as i64 {
                return Err(EvalError::IndexOutOfBounds { index: *i });
            }
            elements[*i as usize] = value;
        }
        (Object::Array(_), _) => {
            return Err(EvalError::NotIndexable {
                left: left.type_name(),
                index: index.type_name(),
            })
        }
        (Object::Map(map), key) => {
            let key = HashKey::try_from(key)?;
            map.borrow_mut().values.insert(key, value);
        }
        _ => {
            return Err(EvalError::NotIndexAssignable {
                type_name: left.type_name(),
            })
        }
    }

    Ok(())
}
