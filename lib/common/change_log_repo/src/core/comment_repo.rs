use asset_diff::Iri;
use chrono::{DateTime, Utc};
use immutable_derive::immutable;
use serde::{Deserialize, Serialize};

use super::change_log_repo::RepoError;

/// 资产评论
#[immutable]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: Iri,
    /// 被评论的资产
    asset: Iri,
    author: Iri,
    content: String,
    created: DateTime<Utc>,
    /// 最后修改时间（未修改过则为空）
    modified: Option<DateTime<Utc>>,
}

impl Comment {
    /// 有效时间戳：修改过取修改时间，否则取创建时间
    #[inline]
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.modified.unwrap_or(self.created)
    }
}

/// 评论仓储（只读）
pub trait CommentRepo: Send + Sync {
    /// 查询某类型资产上的全部评论，顺序不作保证
    fn find_comments_on_type(&self, asset_type: &str) -> Result<Vec<Comment>, RepoError>;
}
