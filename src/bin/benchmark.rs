use pearl::{evaluate, parse, Environment};
use std::env;
use std::process;
use std::time::Instant;

static FIBONACCI: &str = "let fibonacci = fn(x) {
  if x == 0 {
    0
  } else {
    if x == 1 {
      return 1
    } else {
      fibonacci(x - 1) + fibonacci(x - 2)
    }
  }
}
";

fn main() {
    let n: i64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(25);

    let (program, errors) = parse(&format!("{}fibonacci({})", FIBONACCI, n));
    if !errors.is_empty() {
        eprintln!("Parse errors found: {:?}", errors);
        process::exit(1);
    }

    let env = Environment::new();
    let start = Instant::now();
    let result = evaluate(&program, &env);
    let duration = start.elapsed();

    println!(
        "engine=tree-walker, n={}, result={}, duration={}",
        n,
        result,
        duration.as_secs_f64(),
    );
}
