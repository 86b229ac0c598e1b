pub mod alembic;
pub mod command;
pub mod config;
pub mod docker;
pub mod error;
pub mod io;
pub mod models;
pub mod paths;
pub mod poll;
pub mod reporter;

pub use error::{BlitzError, Result};
