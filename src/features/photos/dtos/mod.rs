mod cleanup_dto;

pub use cleanup_dto::{CleanupOverviewDto, CleanupResultDto, DeletedPhotoDirDto, PendingPhotoDirDto};
