use std::{fs, path::Path, process::ExitCode};

use anyhow::Context as _;
use aslc::{
    cli::Args,
    driver::{self, Compiler},
    fuzzing,
    semantic::SemErrors,
    tokenize::tokenize,
};
use clap::Parser as _;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.fuzz {
        print!("{}", fuzzing::generate(args.size));
        return Ok(ExitCode::SUCCESS);
    }

    let path = args.input_path.context("no input file given")?;
    let source = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!(path = %path.display(), bytes = source.len(), "compiling");

    if args.lex {
        for token in tokenize(&source)? {
            println!("{:?}", token.kind);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let program = driver::parse(&source)?;
    if args.parse {
        print!("{program}");
        return Ok(ExitCode::SUCCESS);
    }

    let mut compiler = Compiler::new();
    compiler.analyze(&program)?;
    if compiler.errors.has_errors() {
        report(&path, &source, &compiler.errors);
        return Ok(ExitCode::FAILURE);
    }
    if args.check {
        return Ok(ExitCode::SUCCESS);
    }

    let tac = compiler.generate(&program)?;
    debug!(subroutines = tac.subroutines.len(), "done");
    print!("{tac}");
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn report(path: &Path, source: &str, errors: &SemErrors) {
    for diagnostic in errors.iter() {
        let (line, col) = driver::line_col(source, diagnostic.start);
        eprintln!(
            "{line}:{col}: {}: {}",
            diagnostic.category(),
            diagnostic.error
        );
    }
    eprintln!(
        "{}: {} error(s), no code generated",
        path.display(),
        errors.len()
    );
}
