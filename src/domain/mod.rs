pub mod integrator;
pub mod models;
pub mod settings;
