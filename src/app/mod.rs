//! Application boundary: the port traits the interpreter is written against.

pub mod ports;
