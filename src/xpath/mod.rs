//! XPath Engine
//!
//! Minimal path subset over a document store version:
//! - Absolute child steps `/a/b/c`
//! - At most one attribute-equality predicate per step, `[@k='v']`
//! - Parsed-path caching and parallel batch evaluation

pub mod cache;
pub mod eval;
pub mod lexer;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod parser;

pub use cache::{CacheStats, QueryCache};
pub use eval::{evaluate, query};
#[cfg(feature = "parallel")]
pub use parallel::{evaluate_many, evaluate_paths, query_map, xmap};
pub use parser::{parse, Path, Predicate, Step};
