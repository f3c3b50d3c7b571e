pub mod controllers;
pub mod middleware;
pub mod models;
pub mod services;

pub use controllers::configure_routes;
