mod catalog;
mod note;
mod plan;
mod session;
mod set;
mod setup;

pub use catalog::*;
pub use note::*;
pub use plan::*;
pub use session::*;
pub use set::*;
pub use setup::*;

use crate::api::error::ValidationError;

/// Request payloads validate themselves before any backend call is made
pub trait ValidateModel {
    fn validate(&self) -> Result<(), ValidationError>;
}
