//! rosterq - filter expressions for roster queries
//!
//! A tiny condition language that compiles to the `(field, operator, value)`
//! triples the store's query operation consumes. Conditions are combined
//! with `and`; there is no `or`, grouping, or projection -- the store only
//! supports conjunctive filters.
//!
//! # Syntax Overview
//!
//! ```text
//! -- comparisons
//! yearLevel == "2nd Year"
//! name != 'Juan'
//! credits >= 3
//!
//! -- membership
//! course in ["BS Computer Science", "BS Information Technology"]
//! status not in ["dropped"]
//!
//! -- array fields and patterns
//! tags contains "honors"
//! email like "%@g.msuiit.edu.ph"
//!
//! -- conjunction
//! yearLevel == "2nd Year" and course == "BS Computer Science"
//! ```
//!
//! The pseudo-fields `id`, `createdAt`, and `updatedAt` are resolved by the
//! store, not by this crate; here they are ordinary field names.

mod ast;
mod error;
mod parser;

pub use ast::{Condition, Literal, Operator};
pub use error::ParseError;

/// Parse a filter string into a conjunction of conditions.
///
/// An empty (or all-whitespace) input parses to an empty condition list,
/// which the store treats as "match everything".
pub fn parse(input: &str) -> Result<Vec<Condition>, ParseError> {
    parser::parse_filter(input)
}
