use aslc::{driver, fuzzing, parse::Program};
use assert_cmd::cargo::CommandCargoExt;
use quickcheck::QuickCheck;
use std::{
    fs,
    path::Path,
    process::{Command, Output, Stdio},
};
use tempfile::tempdir;

fn run(args: &[&str], path: Option<&Path>) -> Output {
    let mut bin = Command::cargo_bin(env!("CARGO_PKG_NAME")).expect("missing binary under test");
    bin.args(args);
    if let Some(path) = path {
        bin.arg(path);
    }
    bin.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to execute compiler")
}

fn ensure_success(tag: &str, out: &Output) {
    assert!(
        out.status.success(),
        "{} failed (status: {:?})\n--- stdout ---\n{}\n--- stderr ---\n{}",
        tag,
        out.status.code(),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

#[test]
fn fuzzed_program_compiles_the_same_twice() {
    let tmp = tempdir().expect("failed to create temp dir");
    let src_path = tmp.path().join("random.asl");

    let fuzz_out = run(&["--fuzz"], None);
    ensure_success("--fuzz", &fuzz_out);
    fs::write(&src_path, &fuzz_out.stdout).expect("failed to write fuzz source");

    let first = run(&["--tac"], Some(&src_path));
    ensure_success("--tac", &first);
    let second = run(&["--tac"], Some(&src_path));
    ensure_success("--tac", &second);

    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stdout).contains("function main"));
}

#[test]
fn fuzz_size_requires_fuzz_mode() {
    let tmp = tempdir().expect("failed to create temp dir");
    let src_path = tmp.path().join("empty.asl");
    fs::write(&src_path, "func main()\nendfunc\n").expect("failed to write source");

    let out = run(&["--size", "3"], Some(&src_path));
    assert!(!out.status.success());
}

#[test]
fn missing_input_is_rejected() {
    let out = run(&["--tac", "does/not/exist.asl"], None);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Path does not exist"));
}

#[test]
fn generated_sources_compile_at_every_size() {
    for size in [1, 2, 5, 10, 30, 100] {
        for _ in 0..10 {
            let source = fuzzing::generate(size);
            if let Err(err) = driver::compile(&source) {
                panic!("size {size}: generated program rejected: {err:?}\n{source}");
            }
        }
    }
}

fn compiles_deterministically(program: Program) -> bool {
    let source = program.to_string();
    match (driver::compile(&source), driver::compile(&source)) {
        (Ok(first), Ok(second)) => first.to_string() == second.to_string(),
        (first, _) => {
            eprintln!("generated program rejected: {first:?}\n{source}");
            false
        }
    }
}

#[test]
fn generated_programs_are_well_typed_and_deterministic() {
    QuickCheck::new()
        .tests(60)
        .quickcheck(compiles_deterministically as fn(Program) -> bool);
}

fn printing_is_a_fixpoint(program: Program) -> bool {
    let printed = program.to_string();
    match driver::parse(&printed) {
        Ok(reparsed) => reparsed.to_string() == printed,
        Err(err) => {
            eprintln!("printed program does not parse: {err}\n{printed}");
            false
        }
    }
}

#[test]
fn printed_programs_reparse_to_the_same_text() {
    QuickCheck::new()
        .tests(60)
        .quickcheck(printing_is_a_fixpoint as fn(Program) -> bool);
}
