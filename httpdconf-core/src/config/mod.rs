//! Server profile configuration

pub mod loader;
pub mod types;

pub use loader::ProfileLoader;
pub use types::ServerProfile;
