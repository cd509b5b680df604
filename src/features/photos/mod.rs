//! Photo files and their retention.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/uploads/{report_number}/{file}` | Photo file |
//! | GET | `/api/photos/cleanup` | Retention overview (admin) |
//! | POST | `/api/photos/cleanup` | Run the sweep now (admin) |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod workers;

pub use services::PhotoCleanupService;
pub use workers::PhotoCleanupWorker;
