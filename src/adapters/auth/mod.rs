//! Session adapter. The engine treats authentication as an external
//! collaborator; only a resolved user id crosses the boundary.

pub mod env_session;

pub use env_session::EnvSession;
