pub mod cse;
pub mod date;
pub mod notifications;
pub mod repeat;
pub mod request;
pub mod version;
pub mod xpath;
