pub mod client;
pub mod config;
pub mod dates;
pub mod errors;
pub mod names;
pub mod notifications;
pub mod render;
pub mod repeat;
pub mod request;
pub mod session;
pub mod types;
pub mod xpath;
