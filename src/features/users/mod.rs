//! Account administration.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users` | Users with report counts and role statistics |
//! | POST | `/api/users` | Create a user with an explicit role |
//! | PUT | `/api/users/{id}/role` | Change a user's role |
//! | DELETE | `/api/users/{id}` | Delete a user with their reports and photos |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
