pub mod builder;
pub mod handler;
pub mod models;
pub mod period;
pub mod service;
