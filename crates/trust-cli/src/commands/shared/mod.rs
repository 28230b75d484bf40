pub mod access;
pub mod parse;
