pub mod config;
pub mod convert;
pub mod error;
pub mod handler_utils;
pub mod routes;
pub mod server;
