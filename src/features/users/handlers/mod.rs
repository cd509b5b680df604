pub mod user_handler;

pub use user_handler::{
    __path_create_user, __path_delete_user, __path_list_users, __path_update_user_role,
    create_user, delete_user, list_users, update_user_role,
};
