//! Process configuration, read once from the environment at startup.

pub mod db;
pub mod env;

pub use db::{DbConfig, DbKind};
pub use env::EnvConfig;
