mod report_dto;

pub use report_dto::{
    FormOptionsDto, ReportDetailResponseDto, ReportResponseDto, SexOptionDto, SubmitReportDoc,
    SubmitReportForm, SubmitReportResponseDto,
};
