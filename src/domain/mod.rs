pub mod models;
pub mod collector;
pub mod signature;
pub mod upload;
pub mod request;
pub mod schema;
pub mod errors;

pub use models::*;
pub use collector::*;
pub use signature::*;
pub use upload::*;
pub use request::*;
pub use schema::*;
pub use errors::*;
