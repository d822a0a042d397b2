//! Binary format parsers.

pub mod pe;
