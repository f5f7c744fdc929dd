use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::error::ServerError;
use http::StatusCode;

macro_rules! response_error {
    ($name:ident {
        $(
            #[code($variant_code:expr)]
            $variant:ident
            $({ $($var_struct_body_tt:tt)* })?
        ,)*
    }) => {

        #[derive(Debug, Clone, Serialize, Deserialize, Error)]
        pub enum $name {
            $(
                #[error("{}::{}: {:?}", stringify!($name), stringify!($variant), self)]
                $variant $({
                    $($var_struct_body_tt)*
                })?,
            )*
        }

        impl From<$name> for ServerError<$name> {
            fn from(inner: $name) -> Self {
                let code = match &inner {
                    $( $name::$variant { .. } => $variant_code, )*
                };
                Self::Inner { code, inner }
            }
        }
    };
}

response_error!(WorkoutError {
    #[code(StatusCode::UNAUTHORIZED)]
    Unauthorized,
    #[code(StatusCode::INTERNAL_SERVER_ERROR)]
    Misconfigured { message: String },
    #[code(StatusCode::NOT_FOUND)]
    NotFound { what: String },
    #[code(StatusCode::BAD_GATEWAY)]
    Backend { status: u16, body: String },
});

response_error!(AuthError {
    #[code(StatusCode::UNAUTHORIZED)]
    Unauthorized,
    #[code(StatusCode::BAD_REQUEST)]
    StateMismatch,
    #[code(StatusCode::INTERNAL_SERVER_ERROR)]
    Misconfigured { message: String },
    #[code(StatusCode::BAD_GATEWAY)]
    TokenExchange { message: String },
});
