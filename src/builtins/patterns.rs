use super::{check_arity, string_arg, Evaluator};
use crate::object::*;
use regex::Captures;

fn regex_arg<'a>(name: &'static str, obj: &'a Object) -> Result<&'a RegexValue> {
    match obj {
        Object::Regex(re) => Ok(re.as_ref()),
        other => Err(EvalError::arg_type(name, "a regex", other.type_name())),
    }
}

/// Every group of a match, whole match first; groups that took no part in
/// the match come back as empty strings.
fn groups(captures: &Captures) -> Object {
    let groups: Vec<Object> = captures
        .iter()
        .map(|group| group.map_or("", |m| m.as_str()).into())
        .collect();

    groups.into()
}

pub fn match_first(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("match", &args, 2, 2)?;

    let s = string_arg("match", &args[0])?;
    let re = regex_arg("match", &args[1])?;

    Ok(re
        .regex
        .captures(s)
        .map_or(Object::Null, |captures| groups(&captures)))
}

pub fn match_all(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("match_all", &args, 2, 2)?;

    let s = string_arg("match_all", &args[0])?;
    let re = regex_arg("match_all", &args[1])?;

    let matches: Vec<Object> = re
        .regex
        .captures_iter(s)
        .map(|captures| groups(&captures))
        .collect();

    Ok(matches.into())
}

pub fn regex(_: &dyn Evaluator, args: Vec<Object>) -> Result<Object> {
    check_arity("regex", &args, 1, 1)?;

    let pattern = string_arg("regex", &args[0])?;

    Ok(RegexValue::new(pattern)?.into())
}

#[cfg(test)]
mod test {
    use super::super::test::{call, call_err};
    use crate::object::Object;

    fn pattern(source: &str) -> Object {
        match call("regex", vec![source.into()]) {
            Ok(re) => re,
            Err(err) => panic!("{}", err),
        }
    }

    #[test]
    fn test_match() {
        let re = pattern("(\\w+)@(\\w+)(x)?");

        assert_eq!(
            call("match", vec!["mail bob@test now".into(), re.clone()]),
            Ok(vec!["bob@test".into(), "bob".into(), "test".into(), "".into()].into())
        );
        assert_eq!(
            call("match", vec!["nothing here".into(), re]),
            Ok(Object::Null)
        );
    }

    #[test]
    fn test_match_all() {
        let re = pattern("(\\d)(\\d)");

        let expected: Object = vec![
            vec!["12".into(), "1".into(), "2".into()].into(),
            vec!["34".into(), "3".into(), "4".into()].into(),
        ]
        .into();
        assert_eq!(call("match_all", vec!["12 34 5".into(), re]), Ok(expected));
    }

    #[test]
    fn test_regex_errors() {
        assert!(call_err("regex", vec!["(".into()]).starts_with("invalid regex pattern: "));
        assert_eq!(
            call_err("match", vec!["x".into(), "x".into()]),
            "match() expected a regex, got STRING"
        );
        assert_eq!(pattern("a+").to_string(), "/a+/");
    }
}
