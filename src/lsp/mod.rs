pub mod backend;
pub mod config;
pub mod document;
pub mod features;
pub mod models;
