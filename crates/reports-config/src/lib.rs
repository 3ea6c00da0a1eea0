//! # Reports Config
//!
//! Typed settings for the report engine: schema, defaults, file loading with
//! environment overrides, validation, and a lock-free settings cache.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use cache::*;
pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
