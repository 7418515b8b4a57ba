// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod activity;
pub mod concept;
pub mod game;
pub mod learning_state;
pub mod materia;
pub mod quiz;
pub mod session;
pub mod streak;
pub mod user;
