//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the submission state machine and the interactive session around it.

pub mod state;
pub mod submission;

pub use state::*;
pub use submission::*;
