use crate::prog::Prog;
use std::{convert::From, fmt};

/// Simple custom Error for the proginfo project
pub struct Error {
    pub kind: ErrorKind,
    pub ctx: Option<Prog>,
    pub msg: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// opcode reached the optimizer without a classification (a table defect)
    UnknownInstruction,
    /// error in syntax of an assembly line
    Syntax,
    /// the descriptor table failed its self-check
    Check,
    /// underlying io error
    IO,
    /// catch-all for other errors
    General,
}

impl Error {
    pub fn new(kind: ErrorKind, ctx: Option<Prog>, message: &str) -> Error {
        Error {
            kind,
            ctx,
            msg: String::from(message),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, None, e.to_string().as_str()) }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}: {}", red!("proginfo::Error"), self.msg) }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = write!(f, "{}", self.msg);
        if res.is_ok() {
            if let Some(ctx) = self.ctx.as_ref() {
                res = write!(f, "\nContext: {:?} -> ({})", ctx.op, ctx);
            }
        }
        res
    }
}
impl std::error::Error for Error {}
