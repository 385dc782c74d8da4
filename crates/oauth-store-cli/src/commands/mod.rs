pub mod authorize;
pub mod client;
pub mod store;
pub mod token;
