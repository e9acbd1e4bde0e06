use clap::Parser;
use lazy_static::lazy_static;

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Instructions to resolve, in Plan 9 syntax (e.g. "SHLQ CX, AX")
    pub instructions: Vec<String>,

    /// Listing file to resolve, one instruction per line
    #[arg(short, long)]
    pub file: Vec<String>,

    /// Print the static descriptor table
    #[arg(short, long)]
    pub table: bool,

    /// Check the descriptor table against the classification rules
    #[arg(short, long)]
    pub check: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test", "--check"])
    } else {
        Args::parse()
    };
}

macro_rules! verbose_println {
    ($($p:expr),+) => {
        if crate::config::ARGS.verbose {
            println!($($p),+);
        }
    }
}

/// Nothing was asked for explicitly; behave as if --check was given.
pub fn default_action() -> bool { ARGS.instructions.is_empty() && ARGS.file.is_empty() && !ARGS.table && !ARGS.check }
pub fn check() -> bool { ARGS.check || default_action() }
