pub mod assessments;
pub mod auth;
pub mod core;
pub mod students;
pub mod view;
