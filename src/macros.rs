#![allow(unused_macros)]
// Adding explicit carriage returns to some of these because the inspector output is
// sometimes piped through tools that only honor CRLF line ends.
#[macro_export]
macro_rules! info {
    ($($p:expr),+) => {
        println!(concat!($crate::blue!("INFO"),": {}\r"),format_args!($($p),+))
    }
}

#[macro_export]
macro_rules! warn {
    ($($p:expr),+) => {
        println!(concat!($crate::red!("WARNING"),": {}\r"),format_args!($($p),+))
    }
}
#[macro_export]
macro_rules! general_err {
    ($msg:expr) => {
        $crate::error::Error::new($crate::error::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}

macro_rules! syntax_err {
    ($msg:expr) => {
        $crate::error::Error::new(
            $crate::error::ErrorKind::Syntax,
            None,
            format!("{} {}", $crate::red!("Syntax Error"), $msg).as_str(),
        )
    };
}
macro_rules! unknown_inst_err {
    ($prog:expr) => {
        $crate::error::Error::new(
            $crate::error::ErrorKind::UnknownInstruction,
            Some(($prog).clone()),
            format!("{} {}", $crate::red!("unknown instruction"), $prog).as_str(),
        )
    };
}

#[macro_export]
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
#[macro_export]
macro_rules! red {
    ($msg:expr) => {
        $crate::color!(91, $msg)
    };
}
#[macro_export]
macro_rules! green {
    ($msg:expr) => {
        $crate::color!(92, $msg)
    };
}
#[macro_export]
macro_rules! yellow {
    ($msg:expr) => {
        $crate::color!(93, $msg)
    };
}
#[macro_export]
macro_rules! blue {
    ($msg:expr) => {
        $crate::color!(94, $msg)
    };
}
