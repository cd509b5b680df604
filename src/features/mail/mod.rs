//! Report mail: the notice sent to the municipal contact on submission and
//! the admin's reply to the submitter.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::MailService;
