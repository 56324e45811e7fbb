//! Block Album (workspace facade crate).
//!
//! The rules live in dedicated crates under `crates/`; this package re-exports
//! them as `block_album::{core,engine,input,term,types}` and hosts the
//! process-level pieces the binary needs: environment configuration and
//! file logging.

pub mod app_config;
pub mod logging;

pub use block_album_core as core;
pub use block_album_engine as engine;
pub use block_album_input as input;
pub use block_album_term as term;
pub use block_album_types as types;

pub use app_config::AppConfig;
