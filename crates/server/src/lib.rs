pub mod cli;

mod errors;
pub use errors::*;

mod json;
pub use json::*;

mod session;
pub use session::*;

mod state;
pub use state::*;

pub mod routes;

pub mod sheets;
