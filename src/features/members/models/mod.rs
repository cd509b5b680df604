mod member;

pub use member::{Member, MemberLicence, MemberStatus};
