//! Points of a user on a notebook and the materia score built on them.

mod model;
mod service;

pub use model::NotebookPoints;
pub use service::PointsService;
