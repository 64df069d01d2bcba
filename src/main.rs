use clap::Parser;
use pearl::{evaluate, parse, repl, Environment, Object};
use std::path::{Path, PathBuf};
use std::{fs, io, process};

/// Pearl - A better Perl
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Run the script at this path.
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Evaluate this code instead of a script.
    #[arg(short, long, value_name = "CODE")]
    eval: Option<String>,

    /// Only check the syntax, don't run anything.
    #[arg(long)]
    check: bool,

    /// Script to run, same as --file.
    script: Option<PathBuf>,
}

/// Installs a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Some(code) = &args.eval {
        run_code(code, args.check);
        return;
    }

    match args.file.as_ref().or(args.script.as_ref()) {
        Some(path) => run_file(path, args.check),
        None => {
            if let Err(err) = repl::start(io::stdin().lock(), io::stdout()) {
                eprintln!("error: {}", err);
                process::exit(1);
            }
        }
    }
}

fn run_file(path: &Path, check_only: bool) {
    let source = fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: cant read file {}: {}", path.display(), err);
        process::exit(1);
    });

    run_code(&source, check_only);
}

fn run_code(source: &str, check_only: bool) {
    let (program, errors) = parse(source);
    if !errors.is_empty() {
        for err in errors.iter() {
            eprintln!("{}", err);
        }
        process::exit(1);
    }

    if check_only {
        println!("syntax ok");
        return;
    }

    if let result @ Object::Error(_) = evaluate(&program, &Environment::new()) {
        eprintln!("{}", result);
        process::exit(1);
    }
}
