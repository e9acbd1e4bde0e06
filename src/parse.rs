//! Reads Plan 9 style assembly lines into instruction occurrences.
//!
//! Grammar for a line:
//! ```text
//!  line     = [label ":"] [mnemonic [operand ["," operand]]] [comment]
//!  comment  = "//" ... | ";" ...
//!  operand  = reg | "$" int | "$(" float ")" | mem ["(" reg "*" scale ")"] | target
//!  mem      = [int] "(" reg ")" | symbol ["<>"] [("+"|"-") int] "(" ("SB" | "FP" | "SP") ")"
//!  target   = label | int          (jumps and calls only)
//! ```
//! A lone operand goes to the slot the opcode actually touches: the destination for
//! opcodes that only read or write their right side (INCQ, POPQ, VARDEF, jumps),
//! the source otherwise (PUSHQ, MULQ, CHECKNIL).
use crate::error::Error;
use crate::flags::ProgFlags;
use crate::opcode::Opcode;
use crate::operand::{Addr, AddrType};
use crate::prog::Prog;
use crate::progtable::progtable;
use crate::registers::Reg;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_STATEMENT: Regex =
        Regex::new(r"^\s*(?:(?P<label>[A-Za-z_.·][\w.·]*)\s*:)?\s*(?:(?P<op>[A-Za-z][A-Za-z0-9]*)(?:\s+(?P<args>.*?))?)?\s*$")
            .unwrap();
    static ref RE_CONST: Regex = Regex::new(r"^\$(?P<v>-?(?:0[xX][0-9a-fA-F]+|\d+))$").unwrap();
    static ref RE_FCONST: Regex = Regex::new(r"^\$\((?P<v>-?[0-9]+(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?)\)$").unwrap();
    static ref RE_MEM: Regex = Regex::new(
        r"^(?P<sym>[A-Za-z_.·][\w.·]*)?(?P<static><>)?(?P<off>[+-]?(?:0[xX][0-9a-fA-F]+|\d+))?\((?P<base>[A-Za-z0-9]+)\)(?:\((?P<index>[A-Za-z0-9]+)\*(?P<scale>[1248])\))?$"
    )
    .unwrap();
    static ref RE_TARGET: Regex = Regex::new(r"^(?:[A-Za-z_.·][\w.·]*|\d+)$").unwrap();
}

fn parse_int(s: &str) -> Option<i64> {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.strip_prefix('+').unwrap_or(s)),
    };
    // keep the sign on the digits so i64::MIN parses
    match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(&format!("{}{}", sign, hex), 16).ok(),
        None => format!("{}{}", sign, digits).parse::<i64>().ok(),
    }
}

/// Parses one operand. `branch` allows bare labels and numbers as jump targets.
pub fn parse_operand(s: &str, branch: bool) -> Result<Addr, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Addr::none());
    }
    if let Some(r) = Reg::from_str(s) {
        return Ok(Addr::reg(r));
    }
    if let Some(c) = RE_CONST.captures(s) {
        let v = parse_int(&c["v"]).ok_or_else(|| syntax_err!(format!("bad constant \"{}\"", s)))?;
        return Ok(Addr::konst(v));
    }
    if let Some(c) = RE_FCONST.captures(s) {
        let v: f64 = c["v"]
            .parse()
            .map_err(|_| syntax_err!(format!("bad float constant \"{}\"", s)))?;
        return Ok(Addr::new(AddrType::FConst(v)));
    }
    if let Some(c) = RE_MEM.captures(s) {
        let sym = c.name("sym").map(|m| m.as_str());
        let offset = match c.name("off") {
            Some(m) => parse_int(m.as_str()).ok_or_else(|| syntax_err!(format!("bad offset in \"{}\"", s)))?,
            None => 0,
        };
        let is_static = c.name("static").is_some();
        let base = c["base"].to_ascii_uppercase();
        let mut addr = match (base.as_str(), sym) {
            ("SB", Some(name)) if is_static => Addr::symbol(AddrType::Static, name, offset),
            ("SB", Some(name)) => Addr::symbol(AddrType::Extern, name, offset),
            ("SB", None) if !is_static => Addr { offset, ..Addr::new(AddrType::Extern) },
            // only SB symbols can be file-local
            _ if is_static => return Err(syntax_err!(format!("\"<>\" needs an SB symbol in \"{}\"", s))),
            ("FP", Some(name)) => Addr::symbol(AddrType::Param, name, offset),
            ("FP", None) => Addr { offset, ..Addr::new(AddrType::Param) },
            // a named SP offset is a frame slot, an unnamed one the hardware register
            ("SP", Some(name)) => Addr::symbol(AddrType::Auto, name, offset),
            (reg, None) => match Reg::from_str(reg) {
                Some(r) if !r.is_sse() => Addr::indir(r, offset),
                _ => return Err(syntax_err!(format!("unknown base register \"{}\"", reg))),
            },
            _ => return Err(syntax_err!(format!("bad memory operand \"{}\"", s))),
        };
        if let Some(index) = c.name("index") {
            let r = Reg::from_str(index.as_str())
                .filter(|r| !r.is_sse())
                .ok_or_else(|| syntax_err!(format!("unknown index register \"{}\"", index.as_str())))?;
            let scale = c["scale"].parse::<u8>().unwrap_or(1);
            addr = addr.with_index(r, scale);
        }
        return Ok(addr);
    }
    if branch && RE_TARGET.is_match(s) {
        return Ok(match parse_int(s) {
            Some(target) => Addr { offset: target, ..Addr::new(AddrType::Branch) },
            None => Addr::branch(s),
        });
    }
    Err(syntax_err!(format!("unrecognized operand \"{}\"", s)))
}

/// True when a lone operand of `op` belongs in the destination slot.
fn lone_operand_is_destination(op: Opcode) -> bool {
    if op.is_branch() {
        return true;
    }
    let flags = progtable().get(op).flags;
    let left = ProgFlags::LEFT_ADDR | ProgFlags::LEFT_READ | ProgFlags::LEFT_WRITE;
    let right = ProgFlags::RIGHT_ADDR | ProgFlags::RIGHT_READ | ProgFlags::RIGHT_WRITE;
    !flags.intersects(left) && flags.intersects(right)
}

/// Parses a single instruction line. Returns `None` for blank and comment-only lines.
pub fn parse_prog(line: &str) -> Result<Option<Prog>, Error> {
    let code = match (line.find("//"), line.find(';')) {
        (Some(a), Some(b)) => &line[..a.min(b)],
        (Some(a), None) | (None, Some(a)) => &line[..a],
        (None, None) => line,
    };
    if code.trim().is_empty() {
        return Ok(None);
    }
    let c = RE_STATEMENT
        .captures(code)
        .ok_or_else(|| syntax_err!(format!("can't parse \"{}\"", code.trim())))?;
    // a label on a line of its own
    let Some(mnemonic) = c.name("op").map(|m| m.as_str()) else {
        return Ok(None);
    };
    let op = Opcode::from_name(mnemonic).ok_or_else(|| syntax_err!(format!("unknown opcode \"{}\"", mnemonic)))?;
    let args: Vec<&str> = match c.name("args") {
        Some(m) if !m.as_str().trim().is_empty() => m.as_str().split(',').collect(),
        _ => Vec::new(),
    };
    let branch = op.is_branch();
    let (from, to) = match args.as_slice() {
        [] => return Ok(Some(Prog::bare(op))),
        [one] if lone_operand_is_destination(op) => (Addr::none(), parse_operand(one, branch)?),
        [one] => (parse_operand(one, branch)?, Addr::none()),
        [from, to] => (parse_operand(from, false)?, parse_operand(to, branch)?),
        _ => return Err(syntax_err!(format!("too many operands for {}", op))),
    };
    Ok(Some(Prog::new(op, from, to)))
}

/// Parses a listing, one instruction per line. Line numbers start at 1.
pub fn parse_listing(text: &str) -> Result<Vec<Prog>, Error> {
    let mut progs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match parse_prog(line) {
            Ok(Some(p)) => progs.push(p.at_line(i + 1)),
            Ok(None) => {}
            Err(e) => return Err(Error::new(e.kind, None, format!("line {}: {}", i + 1, e.msg).as_str())),
        }
    }
    Ok(progs)
}
