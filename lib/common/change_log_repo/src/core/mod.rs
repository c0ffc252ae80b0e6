pub mod change_log_repo;
pub mod comment_repo;
