use asset_diff::{DiffError, Iri};
use change_log_repo::RepoError;
use thiserror::Error;

// ============================================================================
// 错误类型
// ============================================================================

/// 变更追踪错误
#[derive(Debug, Error)]
pub enum TrackingError {
    /// 属性分类或变更计算失败（配置错误）
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// 无法确定当前用户，变更不会被记录
    #[error("current principal cannot be resolved, change not recorded")]
    UnresolvedPrincipal,

    /// 变更日志写入失败
    #[error("change log store failed: {0}")]
    Repo(#[from] RepoError),
}

/// 排名查询错误
#[derive(Debug, Error)]
pub enum RankingError {
    /// 变更日志或评论读取失败
    #[error("ranking source failed: {0}")]
    Repo(#[from] RepoError),

    /// 资产或用户查询失败
    #[error("lookup of {id} failed: {source}")]
    Lookup {
        id: Iri,
        #[source]
        source: RepoError,
    },
}
