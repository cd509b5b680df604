pub mod cleanup_handler;

pub use cleanup_handler::{
    __path_execute_cleanup, __path_get_cleanup_overview, execute_cleanup, get_cleanup_overview,
};
