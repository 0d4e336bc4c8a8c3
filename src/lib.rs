pub mod config;
pub mod db;
pub mod error;
pub mod log;
pub mod managers;
pub mod routes;
pub mod server;
pub mod services;
pub mod span;
