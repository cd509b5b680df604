use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Pre-filled reply form for a report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplyDraftDto {
    pub report_id: i64,
    pub report_number: String,
    /// Reporter's account address, or a guess when the account is gone
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// A reply was already sent; sending again is refused
    pub email_sent: bool,
    pub mail_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendReplyDto {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,

    /// Also send a copy to the municipal contact
    #[serde(default)]
    pub send_copy: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendReplyResponseDto {
    pub report_number: String,
    pub recipient: String,
    pub copy_sent: bool,
    pub email_sent_at: NaiveDateTime,
}
