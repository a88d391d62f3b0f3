//! Authentication: sessions, auth modes, and token resolution.

mod session;
mod token;

pub use session::{AuthMode, Session};
pub use token::{resolve_token, resolve_token_with, TokenSource, SECRET_REF_ENV_VAR, TOKEN_ENV_VAR};
