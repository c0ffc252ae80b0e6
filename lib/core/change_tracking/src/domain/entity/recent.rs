use std::collections::BTreeSet;

use asset_diff::{ChangeVector, Iri};
use change_log_repo::Comment;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// 变更种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// 资产创建
    Creation,
    /// 属性更新
    Update,
    /// 评论
    Comment,
}

impl ChangeKind {
    /// 变更向量对应的种类
    pub fn of(vector: &ChangeVector) -> Self {
        if vector.is_creation() {
            ChangeKind::Creation
        } else {
            ChangeKind::Update
        }
    }
}

/// 最近编辑的资产
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyModifiedAsset {
    pub id: Iri,
    /// 展示用标签（按默认语言解析）
    pub label: String,
    pub asset_type: String,
    /// 最近一次变更时间
    pub modified: DateTime<Utc>,
    /// 最近一次变更的作者
    pub modified_by: Iri,
    /// 作者详情（查不到时为空）
    pub editor: Option<User>,
    pub change_kinds: BTreeSet<ChangeKind>,
    /// 术语所属词表
    pub vocabulary: Option<Iri>,
}

/// 最近评论的资产
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentlyCommentedAsset {
    pub id: Iri,
    pub label: String,
    pub asset_type: String,
    /// 排名使用的时间
    pub last_commented: DateTime<Utc>,
    pub change_kinds: BTreeSet<ChangeKind>,
    /// 资产上最近的一条评论
    pub last_comment: Comment,
    /// 指定作者在该资产上最近的一条评论
    pub my_last_comment: Option<Comment>,
    pub vocabulary: Option<Iri>,
}

/// 某一天的变更数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregatedChangeInfo {
    pub date: NaiveDate,
    pub count: usize,
}
