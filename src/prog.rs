use crate::opcode::Opcode;
use crate::operand::Addr;
use std::fmt;

/// One emitted instruction: an opcode and its two operand slots.
/// `from` is the left (source) operand and `to` the right (destination) operand.
#[derive(Clone, Debug, PartialEq)]
pub struct Prog {
    pub op: Opcode,
    pub from: Addr,
    pub to: Addr,
    /// source line, when the instruction came from text
    pub lineno: Option<usize>,
}

impl Prog {
    pub fn new(op: Opcode, from: Addr, to: Addr) -> Self {
        Prog {
            op,
            from,
            to,
            lineno: None,
        }
    }
    /// An instruction without operands.
    pub fn bare(op: Opcode) -> Self { Prog::new(op, Addr::none(), Addr::none()) }
    pub fn at_line(mut self, lineno: usize) -> Self {
        self.lineno = Some(lineno);
        self
    }
}

impl fmt::Display for Prog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(line) = self.lineno {
            write!(f, "(line {}) ", line)?;
        }
        write!(f, "{}", self.op)?;
        match (self.from.is_none(), self.to.is_none()) {
            (true, true) => Ok(()),
            (false, true) => write!(f, "\t{}", self.from),
            (true, false) => write!(f, "\t,{}", self.to),
            (false, false) => write!(f, "\t{},{}", self.from, self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Reg;
    #[test]
    fn display() {
        let p = Prog::new(Opcode::MOVQ, Addr::reg(Reg::AX), Addr::indir(Reg::BX, 16)).at_line(12);
        assert_eq!(p.to_string(), "(line 12) MOVQ\tAX,16(BX)");
        assert_eq!(Prog::bare(Opcode::RET).to_string(), "RET");
        assert_eq!(Prog::new(Opcode::INCQ, Addr::none(), Addr::reg(Reg::CX)).to_string(), "INCQ\t,CX");
    }
}
