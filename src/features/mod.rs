pub mod auth;
pub mod exports;
pub mod mail;
pub mod members;
pub mod photos;
pub mod reports;
pub mod users;
