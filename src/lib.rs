#![doc = include_str!("../README.md")]

pub use metajson_convert as convert;
pub use metajson_value as value;
