pub mod auth;
pub mod dashboard;
pub mod dispute;
pub mod finance;
pub mod order;
pub mod profile;
