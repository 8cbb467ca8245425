pub mod api;
pub mod flag;
pub mod models;
