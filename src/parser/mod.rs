//! Mustache template parser
//!
//! Split into a delimiter-stateful scanner ([`lexer`]) and a tree builder
//! ([`grammar`]) that trims standalone tag lines and matches sections.

pub mod ast;
pub mod grammar;
pub mod lexer;

pub use grammar::parse;
