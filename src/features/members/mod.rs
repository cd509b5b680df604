//! Hunters' association member roster.
//!
//! Report print views and CSV exports look members up by name to show
//! their licence numbers.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::MemberService;
