pub mod report_number;
mod report_service;

pub use report_service::ReportService;
