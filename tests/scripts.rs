use pearl::{parse, Environment, Interpreter, Object};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

/// Runs `source` as a whole program, returning its result and what it printed.
fn run_script(source: &str) -> (Object, String) {
    let (program, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);

    let output = Rc::new(RefCell::new(Vec::new()));
    let result = Interpreter::new(output.clone()).evaluate(&program, &Environment::new());

    let printed = String::from_utf8_lossy(&output.borrow()).into_owned();
    (result, printed)
}

#[test]
fn word_frequency() {
    let source = r#"
# count words, ignoring case
let text = "the cat and the hat and the bat"
let counts = {}
for word in split(lower(text)) {
    if counts[word] == null {
        counts[word] = 0
    }
    counts[word] = counts[word] + 1
}

for word in sort(keys(counts)) {
    print(word, ": ", counts[word])
}
"#;

    let (result, printed) = run_script(source);

    assert_eq!(result, Object::Null);
    assert_eq!(printed, "and: 2\nbat: 1\ncat: 1\nhat: 1\nthe: 3\n");
}

#[test]
fn log_line_extraction() {
    let source = r#"
let log = "ERROR 12:01 disk full
INFO 12:02 retry
ERROR 12:05 disk gone"

let errors = lines(log) |> filter(fn(line) { line ~ /^ERROR/ })
let parsed = map(errors, fn(line) { match(line, /^\w+ (\d+:\d+) (.*)$/) })

for m in parsed {
    print("{m[1]} -> {upper(m[2])}")
}
len(errors)
"#;

    let (result, printed) = run_script(source);

    assert_eq!(result, 2.into());
    assert_eq!(printed, "12:01 -> DISK FULL\n12:05 -> DISK GONE\n");
}

#[test]
fn closures_and_named_arguments() {
    let source = r#"
fn make_counter(start = 0, step = 1) {
    let n = start
    fn() {
        let current = n
        n = n + step
        current
    }
}

let by_one = make_counter()
let by_ten = make_counter(step = 10, start = 100)

by_one(); by_one()
[by_one(), by_ten(), by_ten()]
"#;

    let (result, _) = run_script(source);

    assert_eq!(result, vec![2.into(), 100.into(), 110.into()].into());
}

#[test]
fn pipeline_of_builtins() {
    let source = r#"
let csv = "alice,30\nbob,25\ncarol,35"

let ages = lines(csv) |> map(fn(row) { int(split(row, ",")[1]) })

let total = reduce(ages, fn(acc, age) { acc + age }, 0)
"average: {total / len(ages)}, oldest: {sort(ages)[-1]}"
"#;

    let (result, _) = run_script(source);

    assert_eq!(result, "average: 30, oldest: 35".into());
}

#[test]
fn text_rewriting() {
    let source = r##"
let s = "a-b-c"
print(replace(s, "-", "+"))
print(replace_all(s, "-", "+"))
print(replace_all("x1y22z", /\d+/, "#"))
print(join(reverse(chars("abc")), "."))
print(substr("pearl", 1, 3), " ", repeat("ab", 2), " ", trim("  hi  "))
"##;

    let (_, printed) = run_script(source);

    assert_eq!(printed, "a+b-c\na+b+c\nx#y#z\nc.b.a\near abab hi\n");
}

#[test]
fn runtime_error_stops_the_script() {
    let source = r#"
print("before")
let data = [1, 2, 3]
data[7] = 4
print("after")
"#;

    let (result, printed) = run_script(source);

    assert_eq!(result, Object::Error("array index out of bounds: 7".to_owned()));
    assert_eq!(result.to_string(), "ERROR: array index out of bounds: 7");
    assert_eq!(printed, "before\n");
}

#[test]
fn malformed_program_reports_diagnostics() {
    let (_, errors) = parse("let x = [1, 2\nprint(x)");

    assert!(!errors.is_empty());
    assert!(errors[0].starts_with("line "), "{}", errors[0]);
}

#[test]
fn environment_carries_between_runs() {
    let interpreter = Interpreter::new(Rc::new(RefCell::new(std::io::sink())));
    let env = Environment::new();

    for source in ["let history = []", "push(history, 1)", "push(history, 2)"] {
        let (program, errors) = parse(source);
        assert!(errors.is_empty());
        interpreter.evaluate(&program, &env);
    }

    let (program, _) = parse("history");
    assert_eq!(interpreter.evaluate(&program, &env), vec![1.into(), 2.into()].into());
}
