//! Local container lifecycle for the development database stack.
//!
//! Every call goes through the `docker` CLI via a [`CommandRunner`]
//! (crate::command::CommandRunner) with argument vectors. Container state is
//! never cached; existence is always asked of docker.

pub mod engine;
pub mod pgadmin;
pub mod postgres;

pub use engine::DockerManager;
pub use pgadmin::PgAdminManager;
pub use postgres::PostgresManager;
