pub mod models;
pub mod snapshot;
