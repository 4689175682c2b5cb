mod auth_service_impl;
mod credential_hasher;
mod jwt_codec;

pub use auth_service_impl::*;
pub use credential_hasher::*;
pub use jwt_codec::*;
