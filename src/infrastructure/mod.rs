//! Infrastructure layer providing external service integrations.
//!
//! HTTP access to the filling service, artifact and upload file I/O,
//! configuration and log setup.

pub mod config;
pub mod http;
pub mod logging;
pub mod persistence;

pub use config::*;
pub use http::*;
pub use logging::*;
pub use persistence::*;
