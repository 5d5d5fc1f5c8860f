pub mod auth;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod query;
pub mod review;
pub mod routes;
pub mod scheduler;
pub mod store;
