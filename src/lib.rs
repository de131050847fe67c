// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod job_store;
pub mod models;
pub mod render;
pub mod resolver;
pub mod routes;
pub mod source;
pub mod version;
pub mod worker;
