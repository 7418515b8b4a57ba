//! Bearer-token authentication of the calling student.

pub mod jwt;
pub mod middleware;

pub use middleware::AuthUser;
