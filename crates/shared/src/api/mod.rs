use const_format::concatcp;
pub mod error;
pub mod payloads;
pub mod response_errors;

pub const API_BASE_PATH: &str = "/api/";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Object {
    Ping,
    User,
    Plan,
    Catalog,
    Session,
    SessionSets,
    SessionFinish,
    SetId,
    Setup,
    History,
}

impl Object {
    pub const fn path(&self) -> &str {
        use Object::*;
        match self {
            Ping => concatcp!(API_BASE_PATH, "ping"),
            User => concatcp!(API_BASE_PATH, "user"),
            Plan => concatcp!(API_BASE_PATH, "plan/:day"),
            Catalog => concatcp!(API_BASE_PATH, "catalog"),
            Session => concatcp!(API_BASE_PATH, "session"),
            SessionSets => concatcp!(API_BASE_PATH, "session/:id/sets"),
            SessionFinish => concatcp!(API_BASE_PATH, "session/:id/finish"),
            SetId => concatcp!(API_BASE_PATH, "sets/:id"),
            Setup => concatcp!(API_BASE_PATH, "setup/:exercise"),
            History => concatcp!(API_BASE_PATH, "history/:exercise"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Auth {
    Login,
    Callback,
    Logout,
}

impl Auth {
    pub const fn path(&self) -> &str {
        use Auth::*;
        match self {
            Login => concatcp!(API_BASE_PATH, "auth/login"),
            Callback => concatcp!(API_BASE_PATH, "auth/callback"),
            Logout => concatcp!(API_BASE_PATH, "auth/logout"),
        }
    }
}
