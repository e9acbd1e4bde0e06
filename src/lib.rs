//! # Instruction information for the amd64 optimizer.
//!
//! For every opcode the backend can emit, the descriptor table records how the
//! instruction reads and writes its two operands, which registers it touches
//! implicitly, and its carry-flag and control-flow properties. `proginfo`
//! specializes that entry for one instruction occurrence, folding in the
//! registers implied by its addressing modes.
//!
//! ```
//! use proginfo::{proginfo, Addr, Opcode, Prog, Reg, RegSet};
//!
//! let p = Prog::new(Opcode::SHLQ, Addr::reg(Reg::CX), Addr::indir(Reg::BX, 8));
//! let info = proginfo(&p).unwrap();
//! assert_eq!(info.reguse, RegSet::CX | RegSet::BX);
//! ```
#[macro_use]
mod macros;
pub mod error;
pub mod flags;
pub mod opcode;
pub mod operand;
pub mod parse;
pub mod prog;
pub mod progtable;
pub mod registers;
pub mod resolve;

pub use crate::error::{Error, ErrorKind};
pub use crate::flags::{Access, OpSize, ProgFlags};
pub use crate::opcode::Opcode;
pub use crate::operand::{Addr, AddrType};
pub use crate::prog::Prog;
pub use crate::progtable::{progtable, ProgInfo, ProgTable, Violation};
pub use crate::registers::{Reg, RegSet};
pub use crate::resolve::proginfo;
