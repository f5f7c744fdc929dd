pub mod api;
pub mod metrics;
pub mod model;
pub mod progression;

mod utils;
pub use utils::*;
