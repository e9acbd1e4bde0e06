//! The closed set of opcodes the amd64 backend may hand to the optimizer.
//!
//! Mnemonics follow the Plan 9 assembler: the operand size is part of the name
//! (`ADDQ` is a 64-bit add, `MOVBLZX` zero-extends a byte into a long) and the
//! destination is the right-hand operand.
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

macro_rules! opcodes {
    ($($op:ident),+ $(,)?) => {
        /// Enumeration of every opcode with an entry in the descriptor table.
        #[allow(clippy::upper_case_acronyms, non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Opcode {
            $($op),+
        }
        impl Opcode {
            /// Every opcode, in declaration order (which is also table order).
            pub const ALL: &'static [Opcode] = &[$(Opcode::$op),+];
            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$op => stringify!($op)),+
                }
            }
        }
    };
}

opcodes! {
    // pseudo-instructions and annotations
    TYPE, TEXT, FUNCDATA, PCDATA, UNDEF, USEFIELD, CHECKNIL, VARDEF, VARKILL, NOP,
    // integer arithmetic and logic
    ADCL, ADCQ, ADCW,
    ADDB, ADDL, ADDW, ADDQ,
    ANDB, ANDL, ANDQ, ANDW,
    ORB, ORL, ORQ, ORW,
    SBBB, SBBL, SBBQ, SBBW,
    SUBB, SUBL, SUBQ, SUBW,
    XORB, XORL, XORQ, XORW,
    DECB, DECL, DECQ, DECW,
    INCB, INCL, INCQ, INCW,
    NEGB, NEGL, NEGQ, NEGW,
    NOTB, NOTL, NOTQ, NOTW,
    // comparisons
    CMPB, CMPL, CMPQ, CMPW,
    TESTB, TESTL, TESTQ, TESTW,
    COMISD, COMISS, UCOMISD, UCOMISS,
    // floating point arithmetic
    ADDSD, ADDSS, SUBSD, SUBSS, MULSD, MULSS, DIVSD, DIVSS,
    // wide multiply and divide
    DIVB, DIVL, DIVQ, DIVW,
    IDIVB, IDIVL, IDIVQ, IDIVW,
    IMULB, IMULL, IMULQ, IMULW,
    MULB, MULL, MULQ, MULW,
    CDQ, CQO, CWD,
    // conversions
    CVTSD2SL, CVTSD2SQ, CVTSD2SS, CVTSL2SD, CVTSL2SS, CVTSQ2SD, CVTSQ2SS,
    CVTSS2SD, CVTSS2SL, CVTSS2SQ, CVTTSD2SL, CVTTSD2SQ, CVTTSS2SL, CVTTSS2SQ,
    MOVBLSX, MOVBLZX, MOVBQSX, MOVBQZX, MOVBWSX, MOVBWZX,
    MOVLQSX, MOVLQZX, MOVWLSX, MOVWLZX, MOVWQSX, MOVWQZX, MOVQL,
    // moves
    MOVB, MOVL, MOVQ, MOVW, MOVSD, MOVSS, MOVAPD,
    LEAL, LEAQ,
    POPQ, PUSHQ,
    XCHGB, XCHGL, XCHGQ, XCHGW,
    // string and block operations
    MOVSB, MOVSL, MOVSQ, MOVSW, DUFFCOPY,
    STOSB, STOSL, STOSQ, STOSW, DUFFZERO,
    REP, REPN, CLD, STD,
    // shifts and rotates
    RCLB, RCLL, RCLQ, RCLW,
    RCRB, RCRL, RCRQ, RCRW,
    ROLB, ROLL, ROLQ, ROLW,
    RORB, RORL, RORQ, RORW,
    SALB, SALL, SALQ, SALW,
    SARB, SARL, SARQ, SARW,
    SHLB, SHLL, SHLQ, SHLW,
    SHRB, SHRL, SHRQ, SHRW,
    // control flow
    JCC, JCS, JEQ, JGE, JGT, JHI, JLE, JLS, JLT, JMI, JNE, JOC, JOS, JPC, JPL, JPS,
    JMP, CALL, RET,
}

lazy_static! {
    static ref OPCODE_BY_NAME: HashMap<&'static str, Opcode> = Opcode::ALL.iter().map(|op| (op.name(), *op)).collect();
}

impl Opcode {
    pub const COUNT: usize = Opcode::ALL.len();
    // the given string may be in any case
    pub fn from_name(name: &str) -> Option<Opcode> {
        OPCODE_BY_NAME.get(name.to_ascii_uppercase().as_str()).copied()
    }
    pub fn index(self) -> usize { self as usize }
    /// Jumps and calls take a branch target rather than a data operand.
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Opcode::JCC
                | Opcode::JCS
                | Opcode::JEQ
                | Opcode::JGE
                | Opcode::JGT
                | Opcode::JHI
                | Opcode::JLE
                | Opcode::JLS
                | Opcode::JLT
                | Opcode::JMI
                | Opcode::JNE
                | Opcode::JOC
                | Opcode::JOS
                | Opcode::JPC
                | Opcode::JPL
                | Opcode::JPS
                | Opcode::JMP
                | Opcode::CALL
        )
    }
}
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:width$}", self.name(), width = f.width().unwrap_or(0)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn names_round_trip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_name(op.name()), Some(*op));
        }
        assert_eq!(Opcode::from_name("shlq"), Some(Opcode::SHLQ));
        assert_eq!(Opcode::from_name("CPUID"), None);
    }
    #[test]
    fn index_matches_declaration_order() {
        assert_eq!(Opcode::COUNT, 199);
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
    }
}
