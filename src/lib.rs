pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod media;
pub mod model;
pub mod server;
pub mod validate;

pub use error::ShowcaseError;
