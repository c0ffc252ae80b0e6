//! 仓储接口定义
//!
//! 排名结果需要的资产标签和用户信息由外部提供，这里只定义读取接口

use asset_diff::{Asset, Iri, Literal};
use change_log_repo::RepoError;

use crate::domain::entity::User;

/// 资产摘要（排名结果的展示信息）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSummary {
    pub id: Iri,
    pub asset_type: String,
    /// 原始标签值
    pub label: Option<Literal>,
    /// 术语所属词表
    pub vocabulary: Option<Iri>,
}

impl AssetSummary {
    /// 从资产快照提取摘要
    pub fn of(asset: &dyn Asset) -> Self {
        Self {
            id: asset.asset_id(),
            asset_type: asset.asset_type().to_string(),
            label: asset.label(),
            vocabulary: None,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Iri) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }
}

/// 资产查询接口
pub trait AssetLookup: Send + Sync {
    /// 按类型和标识符查询资产摘要，不存在返回 `Ok(None)`
    fn find_asset(&self, asset_type: &str, id: &Iri) -> Result<Option<AssetSummary>, RepoError>;
}

/// 用户查询接口
pub trait UserLookup: Send + Sync {
    fn find_user(&self, id: &Iri) -> Result<Option<User>, RepoError>;
}
