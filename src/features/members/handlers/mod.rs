pub mod member_handler;

pub use member_handler::{
    __path_create_member, __path_delete_member, __path_get_member, __path_import_roster,
    __path_list_members, __path_update_member, create_member, delete_member, get_member,
    import_roster, list_members, update_member,
};
