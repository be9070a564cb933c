pub mod cli;
pub mod driver;
pub mod fuzzing;
pub mod parse;
pub mod semantic;
pub mod symtable;
pub mod tacky;
pub mod tokenize;
pub mod types;
