//! # proginfo: inspect the amd64 instruction descriptor table.
//!
//! ## Getting Started
//! To see what the optimizer knows about an instruction:
//! ```text
//! cargo run -- "SHLQ CX, 8(BX)(SI*8)"
//! ```
//! ...or resolve every instruction in a listing:
//! ```text
//! proginfo -f /path/to/listing.s
//! ```
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod config;
use proginfo::{blue, general_err, green, info, red, warn, yellow};
use proginfo::{parse, progtable, Access, Error, ErrorKind, OpSize, Prog, ProgInfo, ProgTable};
use std::fs;
use std::result::Result;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // run does all the work
    if let Err(e) = run() {
        println!("{}", e);
        return Err(Box::new(e));
    }
    Ok(())
}
/// run drives the top level functionality (check, dump, resolve) of the app
fn run() -> Result<(), Error> {
    let table = progtable();
    if config::check() {
        check_table(table)?;
    }
    if config::ARGS.table {
        print_table(table);
    }
    let mut failures = 0usize;
    for text in &config::ARGS.instructions {
        match resolve_line(table, text) {
            Ok((p, pi)) => println!("{}", describe(&p, &pi)),
            Err(e) => {
                println!("{}", e);
                failures += 1;
            }
        }
    }
    for filename in &config::ARGS.file {
        process_file(table, filename)?;
    }
    if failures > 0 {
        return Err(general_err!(format!("{} instruction(s) could not be resolved", failures)));
    }
    Ok(())
}
/// Runs the table self-check and reports every violation.
fn check_table(table: &ProgTable) -> Result<(), Error> {
    let violations = table.verify();
    if violations.is_empty() {
        info!("Descriptor table OK ({} opcodes)", table.iter().count());
        return Ok(());
    }
    for v in &violations {
        warn!("{}", v);
    }
    Err(Error::new(
        ErrorKind::Check,
        None,
        format!("descriptor table has {} violation(s)", violations.len()).as_str(),
    ))
}
fn print_table(table: &ProgTable) {
    for (op, pi) in table.iter() {
        println!(concat!(green!("{:10}"), " {}"), op.name(), pi);
    }
}
/// Parses and resolves a single instruction.
fn resolve_line(table: &ProgTable, text: &str) -> Result<(Prog, ProgInfo), Error> {
    let p = parse::parse_prog(text)?.ok_or_else(|| general_err!(format!("no instruction in \"{}\"", text)))?;
    verbose_println!("{} from: {:?} to: {:?}", blue!("parsed"), p.from, p.to);
    let pi = table.proginfo(&p)?;
    Ok((p, pi))
}
/// Short form of an operand access: r, w, rw or -.
fn access_str(a: Access) -> &'static str {
    match (a.reads(), a.writes()) {
        (true, true) => "rw",
        (true, false) => "r",
        (false, true) => "w",
        (false, false) => "-",
    }
}
fn size_str(size: Option<OpSize>) -> String {
    match size {
        Some(s) if s.is_float() => format!("{} bytes float", s.width()),
        Some(s) => format!("{} bytes", s.width()),
        None => "-".to_string(),
    }
}
fn describe(p: &Prog, pi: &ProgInfo) -> String {
    let mut out = format!("{}\n", p);
    out.push_str(&format!(concat!("  ", yellow!("flags"), ": {}\n"), pi.flags));
    out.push_str(&format!(
        concat!("  ", yellow!("size"), ": {}  ", yellow!("left"), ": {}  ", yellow!("right"), ": {}\n"),
        size_str(pi.flags.size()),
        access_str(pi.flags.left()),
        access_str(pi.flags.right())
    ));
    out.push_str(&format!(concat!("  ", yellow!("use"), ":   {}\n"), pi.reguse));
    out.push_str(&format!(concat!("  ", yellow!("set"), ":   {}"), pi.regset));
    if !pi.regindex.is_empty() {
        out.push_str(&format!(concat!("\n  ", yellow!("index"), ": {}"), pi.regindex));
    }
    out
}
/// process_file resolves every instruction in a listing and stops at the first failure
fn process_file(table: &ProgTable, filename: &str) -> Result<(), Error> {
    let text = fs::read_to_string(filename)?;
    info!("Resolving {}", filename);
    let progs = parse::parse_listing(&text)?;
    for p in &progs {
        let pi = table.proginfo(p)?;
        println!("{}", describe(p, &pi));
    }
    verbose_println!("{} {} instruction(s) from {}", red!("resolved"), progs.len(), filename);
    Ok(())
}
