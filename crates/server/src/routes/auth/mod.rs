mod callback;
mod login;
mod logout;
mod user;

pub use callback::*;
pub use login::*;
pub use logout::*;
pub use user::*;
