mod member_service;

pub use member_service::{MemberService, ROSTER_FILE};
