pub mod export_handler;

pub use export_handler::{__path_export_reports, __path_get_stats, export_reports, get_stats};
