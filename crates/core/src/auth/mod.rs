//! Authenticated principal and the role checks core services perform on it.

mod principal;

pub use principal::{Principal, Role};
