//! Operand descriptors: how an operand's value or address is computed.
use crate::registers::{Reg, RegSet};
use std::fmt;

/// Addressing mode of one operand slot.
#[derive(Clone, Debug, PartialEq)]
pub enum AddrType {
    /// slot unused
    None,
    /// register direct
    Reg(Reg),
    /// memory at offset(base)
    Indir(Reg),
    /// immediate integer
    Const(i64),
    /// immediate float
    FConst(f64),
    /// global symbol, name+offset(SB)
    Extern,
    /// file-local symbol, name<>+offset(SB)
    Static,
    /// local frame slot, name+offset(SP)
    Auto,
    /// argument slot, name+offset(FP)
    Param,
    /// branch target
    Branch,
}

/// One operand of an instruction occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct Addr {
    pub typ: AddrType,
    /// index register and scale for indexed addressing
    pub index: Option<(Reg, u8)>,
    pub offset: i64,
    /// symbol or label name
    pub sym: Option<String>,
}

impl Addr {
    pub fn none() -> Self { Addr::new(AddrType::None) }
    pub fn new(typ: AddrType) -> Self {
        Addr {
            typ,
            index: None,
            offset: 0,
            sym: None,
        }
    }
    pub fn reg(r: Reg) -> Self { Addr::new(AddrType::Reg(r)) }
    pub fn konst(v: i64) -> Self { Addr::new(AddrType::Const(v)) }
    pub fn indir(base: Reg, offset: i64) -> Self {
        Addr {
            offset,
            ..Addr::new(AddrType::Indir(base))
        }
    }
    pub fn symbol(typ: AddrType, name: &str, offset: i64) -> Self {
        Addr {
            offset,
            sym: Some(name.to_string()),
            ..Addr::new(typ)
        }
    }
    pub fn branch(label: &str) -> Self { Addr::symbol(AddrType::Branch, label, 0) }
    pub fn with_index(mut self, r: Reg, scale: u8) -> Self {
        self.index = Some((r, scale));
        self
    }

    pub fn is_none(&self) -> bool { self.typ == AddrType::None }
    pub fn is_const(&self) -> bool { matches!(self.typ, AddrType::Const(_)) }
    pub fn is_mem(&self) -> bool {
        matches!(
            self.typ,
            AddrType::Indir(_) | AddrType::Extern | AddrType::Static | AddrType::Auto | AddrType::Param
        )
    }
    /// Registers read to form this operand's address: the base of an indirect
    /// operand and the index register. Non-memory operands have no address.
    pub fn address_regs(&self) -> RegSet {
        let mut regs = RegSet::empty();
        if !self.is_mem() {
            return regs;
        }
        if let AddrType::Indir(base) = self.typ {
            regs.add(base);
        }
        if let Some((index, _)) = self.index {
            regs.add(index);
        }
        regs
    }
}
impl Default for Addr {
    fn default() -> Self { Addr::none() }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = self.sym.as_deref().unwrap_or("");
        let off = if self.offset == 0 && !name.is_empty() {
            String::new()
        } else if self.offset >= 0 && !name.is_empty() {
            format!("+{}", self.offset)
        } else {
            self.offset.to_string()
        };
        match &self.typ {
            AddrType::None => return Ok(()),
            AddrType::Reg(r) => write!(f, "{}", r)?,
            AddrType::Indir(base) if self.offset == 0 => write!(f, "({})", base)?,
            AddrType::Indir(base) => write!(f, "{}({})", self.offset, base)?,
            AddrType::Const(v) => write!(f, "${}", v)?,
            AddrType::FConst(v) => write!(f, "$({:?})", v)?,
            AddrType::Extern => write!(f, "{}{}(SB)", name, off)?,
            AddrType::Static => write!(f, "{}<>{}(SB)", name, off)?,
            AddrType::Auto => write!(f, "{}{}(SP)", name, off)?,
            AddrType::Param => write!(f, "{}{}(FP)", name, off)?,
            AddrType::Branch if name.is_empty() => write!(f, "{}", self.offset)?,
            AddrType::Branch => write!(f, "{}", name)?,
        }
        if let Some((index, scale)) = self.index {
            write!(f, "({}*{})", index, scale)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn address_registers() {
        assert_eq!(Addr::indir(Reg::BX, 8).address_regs(), RegSet::BX);
        assert_eq!(
            Addr::indir(Reg::BX, 0).with_index(Reg::CX, 8).address_regs(),
            RegSet::BX | RegSet::CX
        );
        assert_eq!(
            Addr::symbol(AddrType::Extern, "runtime·zerobase", 0)
                .with_index(Reg::SI, 4)
                .address_regs(),
            RegSet::SI
        );
        // a register operand is a value, not an address
        assert!(Addr::reg(Reg::AX).address_regs().is_empty());
        assert!(Addr::symbol(AddrType::Auto, "x", -8).address_regs().is_empty());
        // an index only means something on a memory operand
        assert!(Addr::reg(Reg::AX).with_index(Reg::CX, 4).address_regs().is_empty());
        assert!(Addr::konst(8).with_index(Reg::CX, 4).address_regs().is_empty());
    }
    #[test]
    fn plan9_syntax() {
        assert_eq!(Addr::indir(Reg::BP, -8).to_string(), "-8(BP)");
        assert_eq!(Addr::indir(Reg::BX, 0).with_index(Reg::CX, 8).to_string(), "(BX)(CX*8)");
        assert_eq!(Addr::konst(-1).to_string(), "$-1");
        assert_eq!(Addr::symbol(AddrType::Param, "x", 8).to_string(), "x+8(FP)");
        assert_eq!(Addr::symbol(AddrType::Static, "tab", 0).to_string(), "tab<>(SB)");
        assert_eq!(Addr::new(AddrType::FConst(1.5)).to_string(), "$(1.5)");
        assert_eq!(Addr::none().to_string(), "");
    }
    #[test]
    fn classification() {
        assert!(Addr::konst(3).is_const());
        assert!(!Addr::new(AddrType::FConst(3.0)).is_const());
        assert!(Addr::indir(Reg::AX, 0).is_mem());
        assert!(!Addr::reg(Reg::AX).is_mem());
        assert!(Addr::default().is_none());
    }
}
