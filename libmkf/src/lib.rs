//! Compile grammars written in an extended McKeeman Form, then match text
//! against them.
//!
//! ```
//! let grammar = libmkf::compile(
//!     "number\n\
//!      \tdigit+\n\
//!      digit\n\
//!      \t'0' . '9'",
//! )?;
//!
//! let tree = grammar.parse("2024")?;
//! assert_eq!(tree.rule(), Some("number"));
//! assert_eq!(tree.children().len(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
extern crate serde_derive;

pub mod checked;
pub mod fault;
pub mod matcher;
pub mod node;
pub mod parser;
pub mod range;

pub use fault::{GrammarErr, MatchErr, SyntaxErr};
pub use matcher::{Matcher, Trailing, DEFAULT_MAX_DEPTH};
pub use node::Node;
pub use parser::{compile, syntax::Grammar};
