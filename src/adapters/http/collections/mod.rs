//! HTTP adapter for the generic collection gateway.

mod dto;
mod handlers;
mod routes;

pub use handlers::list_vendors;
pub use routes::collection_routes;
