use crate::environment::Environment;
use crate::evaluator::Interpreter;
use crate::object::Object;
use crate::parser;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

static PROMPT: &str = "pearl> ";
static CONTINUATION_PROMPT: &str = "...    ";

/// Runs the read-eval-print loop until `exit`, `quit` or end of input.
///
/// `print` output and echoed results both go to `output`. The environment
/// lives for the whole session.
pub fn start<R: BufRead, W: Write + 'static>(input: R, output: W) -> io::Result<()> {
    let output = Rc::new(RefCell::new(output));
    let interpreter = Interpreter::new(output.clone());
    let env = Environment::new();

    writeln!(output.borrow_mut(), "Pearl - A better Perl")?;
    writeln!(output.borrow_mut(), "Type 'exit' or Ctrl+D to quit\n")?;

    let mut lines = input.lines();
    let mut pending = String::new();

    loop {
        {
            let mut out = output.borrow_mut();
            let prompt = if pending.is_empty() { PROMPT } else { CONTINUATION_PROMPT };
            write!(out, "{}", prompt)?;
            out.flush()?;
        }

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                writeln!(output.borrow_mut(), "\nbye!")?;
                return Ok(());
            }
        };

        if pending.is_empty() && matches!(line.trim(), "exit" | "quit") {
            writeln!(output.borrow_mut(), "bye!")?;
            return Ok(());
        }

        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(&line);

        if !is_balanced(&pending) {
            continue;
        }
        let source = std::mem::take(&mut pending);

        let (program, errors) = parser::parse(&source);
        if !errors.is_empty() {
            let mut out = output.borrow_mut();
            for err in errors.iter() {
                writeln!(out, "\t{}", err)?;
            }
            continue;
        }

        match interpreter.evaluate(&program, &env) {
            Object::Null => {}
            result => writeln!(output.borrow_mut(), "{}", result)?,
        }
    }
}

/// Whether every `{`, `(` and `[` outside string literals has been closed.
fn is_balanced(source: &str) -> bool {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut prev = None;

    for c in source.chars() {
        if in_string {
            in_string = !(c == '"' && prev != Some('\\'));
        } else {
            match c {
                '"' => in_string = true,
                '{' | '(' | '[' => depth += 1,
                '}' | ')' | ']' => depth -= 1,
                _ => {}
            }
        }
        prev = Some(c);
    }

    depth <= 0 && !in_string
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_session(input: &str) -> String {
        let buffer = SharedBuffer::default();
        start(input.as_bytes(), buffer.clone()).unwrap();

        let output = String::from_utf8(buffer.0.borrow().clone()).unwrap();
        output
    }

    #[test]
    fn test_is_balanced() {
        let cases = vec![
            ("let x = 1", true),
            ("fn f() {", false),
            ("fn f() {\n  1\n}", true),
            ("[1, (2", false),
            ("\"{\"", true),
            ("\"unterminated", false),
            ("\"a\\\"{\"", true),
            ("}", true),
        ];

        for (source, expected) in cases {
            assert_eq!(is_balanced(source), expected, "source: {:?}", source);
        }
    }

    #[test]
    fn test_echoes_results() {
        let output = run_session("let x = 2\nx * 21\nprint(\"hi\")\n");

        assert!(output.contains("pearl> 2\n"), "{}", output);
        assert!(output.contains("pearl> 42\n"), "{}", output);
        assert!(output.contains("pearl> hi\n"), "{}", output);
        assert!(!output.contains("null"), "{}", output);
        assert!(output.ends_with("pearl> \nbye!\n"), "{}", output);
    }

    #[test]
    fn test_multiline_input() {
        let output = run_session("let add = fn(a, b) {\n  a + b\n}\nadd(1, 2)\n");

        assert!(output.contains("pearl> ...    ...    fn(a, b)"), "{}", output);
        assert!(output.contains("pearl> 3\n"), "{}", output);
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let output = run_session("let = 1\n1 / 0\n\"still here\"\nexit\n\"unreached\"\n");

        assert!(output.contains("\tline 1, col 1: expected IDENT, got ASSIGN instead\n"), "{}", output);
        assert!(output.contains("ERROR: division by zero\n"), "{}", output);
        assert!(output.contains("still here\n"), "{}", output);
        assert!(output.ends_with("pearl> bye!\n"), "{}", output);
        assert!(!output.contains("unreached"), "{}", output);
    }
}
