pub mod mail_handler;

pub use mail_handler::{__path_get_reply_draft, __path_send_reply, get_reply_draft, send_reply};
