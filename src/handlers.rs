pub mod admin;
pub mod auth;
pub mod client;
pub mod orders;
pub mod quote;
pub mod supplier;
pub mod upload;
