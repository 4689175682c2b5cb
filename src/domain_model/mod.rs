mod refresh_token;
mod user;

pub use refresh_token::*;
pub use user::*;
