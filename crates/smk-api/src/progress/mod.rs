//! Domain progress of a user on a notebook.

mod service;

pub use service::{DomainProgressService, srs_state};
