pub mod cycle;
pub mod models;
pub mod settings;
