//! Parse `.env` files and apply them to pluggable environment stores.
//!
//! Parsing runs in two stages: [`process_lines`] reassembles raw lines into
//! logical assignment lines (joining multi-line double-quoted values), then
//! [`parse_entry`] validates and decodes each one. The first malformed line
//! aborts the whole parse.
//!
//! [`EnvLoader::load`] applies entries to a [`Repository`], which defaults to
//! a process-isolated in-memory map. Convenience loaders (`dotenv`,
//! `from_path`, `from_filename`) mutate the process environment and are
//! `unsafe`, because callers must guarantee no concurrent process-environment
//! access.

mod env;
mod error;
mod lines;
mod loader;
mod model;
mod parser;
mod repository;
mod store;
mod validator;

pub use env::TargetEnv;
pub use error::{Error, ParseError, ParseErrorKind, Result, ValidationError};
pub use lines::{process_lines, split_lines};
pub use loader::{EnvLoader, dotenv, from_filename, from_path};
pub use model::{Entry, LoadReport, LogicalLine, SubstitutionMode};
pub use parser::{parse_bytes, parse_entry, parse_reader, parse_str};
pub use repository::{Repository, RepositoryBuilder};
pub use store::{Source, Store};
pub use validator::Validator;
