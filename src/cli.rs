use std::{path::PathBuf, str::FromStr as _};

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Print the token stream
    #[arg(long, short, group = "flag")]
    pub lex: bool,
    /// Print the parsed program back as source
    #[arg(long, short, group = "flag")]
    pub parse: bool,
    /// Stop after type checking
    #[arg(long, short, group = "flag")]
    pub check: bool,
    /// Print three-address code (the default)
    #[arg(long, short, group = "flag")]
    pub tac: bool,
    /// Print a random well-typed program
    #[arg(long, group = "flag")]
    pub fuzz: bool,

    /// Size hint for `--fuzz`
    #[arg(long, default_value_t = 10, requires = "fuzz")]
    pub size: usize,

    #[arg(long, short)]
    pub verbose: bool,

    #[arg(value_parser = path_exists, required_unless_present = "fuzz")]
    pub input_path: Option<PathBuf>,
}

pub fn path_exists(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from_str(s).map_err(|e| format!("Invalid path: {}", e))?;
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Path does not exist: {}", s))
    }
}
