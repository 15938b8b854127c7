//! Authentication adapters - implementations of the SessionValidator port.

mod jwt;
mod mock;

pub use jwt::JwtSessionValidator;
pub use mock::MockSessionValidator;
