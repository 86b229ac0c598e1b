//! Alembic workspace provisioning.
//!
//! [`AlembicManager`] builds a workspace directory that Alembic can run in:
//! `alembic.ini`, an `env.py` that loads every model module, the models
//! themselves, and package markers. After a revision is autogenerated it
//! patches the script so the schemas the models live in are created first.

pub mod manager;
pub mod migration;
pub mod runner;
pub mod templates;

pub use manager::{AlembicManager, ConnectionSource, PatchOutcome, ProvisionOptions};
pub use migration::{InsertionPoint, Splice};
pub use runner::AlembicCommandRunner;
