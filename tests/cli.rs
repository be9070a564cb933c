use assert_cmd::cargo::CommandCargoExt;
use std::{
    path::Path,
    process::{Command, Output, Stdio},
};

fn run_compiler(args: &[&str], path: &Path) -> datatest_stable::Result<Output> {
    let mut bin = Command::cargo_bin(env!("CARGO_PKG_NAME"))?;
    let output = bin
        .args(args)
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;
    eprintln!(
        "[{}] {:?} status: {:?}\n--- stderr ---\n{}",
        path.display(),
        args,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(output)
}

fn accepts_program(path: &Path) -> datatest_stable::Result<()> {
    let check = run_compiler(&["--check"], path)?;
    assert!(check.status.success(), "--check rejected a valid program");
    assert!(check.stdout.is_empty(), "--check printed code");

    let first = run_compiler(&[], path)?;
    assert!(first.status.success(), "code generation failed");
    let text = String::from_utf8(first.stdout)?;
    assert!(text.contains("function main"), "no main subroutine in:\n{text}");
    assert!(text.trim_end().ends_with("endfunction"));

    let second = run_compiler(&["--tac"], path)?;
    assert_eq!(text, String::from_utf8(second.stdout)?, "output is not deterministic");

    let parsed = run_compiler(&["--parse"], path)?;
    assert!(parsed.status.success(), "--parse failed");

    Ok(())
}

fn rejects_program(path: &Path) -> datatest_stable::Result<()> {
    let output = run_compiler(&[], path)?;
    assert!(!output.status.success(), "invalid program was accepted");
    assert!(output.stdout.is_empty(), "code was printed for an invalid program");
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("rror"), "no error reported:\n{stderr}");
    Ok(())
}

datatest_stable::harness! {
    { test = accepts_program, root = "tests/programs/ok", pattern = r"\.asl$" },
    { test = rejects_program, root = "tests/programs/err", pattern = r"\.asl$" },
}
