pub mod adapter;
pub mod core;

// 导出核心仓储接口
pub use crate::core::change_log_repo::{ChangeLogRepo, RepoError};
pub use crate::core::comment_repo::{Comment, CommentRepo};

// 导出适配器实现
pub use crate::adapter::jsonl_repo::JsonlChangeLogRepo;
pub use crate::adapter::mem_repo::{MemChangeLogRepo, MemCommentRepo};
