mod report;

pub use report::{split_list, AnimalSex, Report, REPORT_COLUMNS};
