mod mail_dto;

pub use mail_dto::{ReplyDraftDto, SendReplyDto, SendReplyResponseDto};
