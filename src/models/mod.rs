//! Data Models
//!
//! Domain records served through the cache, and request/response DTOs for the gateway API.

mod domain;
mod requests;
mod responses;

pub use domain::*;
pub use requests::*;
pub use responses::*;
