pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod lang;
pub mod models;
pub mod requests;
pub mod routes;
pub mod services;
pub mod templates_structs;
