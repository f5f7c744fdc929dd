mod client;
pub use client::*;

pub mod codec;

mod schema;
pub use schema::*;

mod store;
pub use store::*;
