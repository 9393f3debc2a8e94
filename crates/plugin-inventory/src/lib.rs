//! Time-bounded cache of the audio plug-ins installed on this machine.
//!
//! The cache walks a set of filesystem roots looking for bundle and
//! single-file plug-ins, optionally loads each candidate to weed out broken
//! entries, and hands callers snapshot copies of the result.

mod cache;
mod config;
mod error;
mod listing;
mod loader;
mod record;
mod roots;
mod walk;

#[cfg(test)]
mod testing;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use listing::*;
pub use loader::*;
pub use record::*;
pub use roots::*;
pub use walk::*;
