//! Hunting activity reports.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/reports/form-options` | Choice lists for the form |
//! | POST | `/api/reports` | Submit a report with photos (multipart) |
//! | GET | `/api/reports` | Own reports, or all for admins |
//! | GET | `/api/reports/{id}` | Print view with licences and photos |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ReportService;
