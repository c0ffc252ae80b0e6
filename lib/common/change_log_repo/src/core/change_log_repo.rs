use std::cmp::Reverse;

use asset_diff::{ChangeVector, Iri};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// 仓储错误类型
#[derive(Debug, Error)]
pub enum RepoError {
    /// 底层存储读写失败
    #[error("存储 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化或反序列化失败
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 持久化日志中存在无法解析的记录
    #[error("变更日志第 {line} 行已损坏: {reason}")]
    Corrupted { line: usize, reason: String },

    /// 其它存储后端错误
    #[error("存储后端错误: {0}")]
    Backend(String),
}

/// 变更日志仓储
///
/// 只追加的变更向量存储。写入的每个批次整体可见：读取方要么看到批次中的全部记录，要么一条都看不到。
///
/// 所有查询按时间戳降序返回；时间戳相同时后写入的记录排在前面。
pub trait ChangeLogRepo: Send + Sync {
    /// 原子追加一个批次
    ///
    /// # 参数
    /// - `batch`: 同一次变更产生的全部变更向量，空批次不产生任何写入
    ///
    /// # 返回
    /// - `Ok(())`: 批次已持久化
    /// - `Err(RepoError)`: 写入失败，批次中的记录都不可见
    fn append(&self, batch: &[ChangeVector]) -> Result<(), RepoError>;

    /// 查询单个资产的全部变更（按时间戳降序）
    fn find_all_for_entity(
        &self,
        entity_type: &str,
        entity_id: &Iri,
    ) -> Result<Vec<ChangeVector>, RepoError>;

    /// 查询某类型资产在 `since` 之后（含）的全部变更（按时间戳降序）
    ///
    /// 最近变更排名以此为数据源。
    fn find_changes_of_type_since(
        &self,
        since: DateTime<Utc>,
        entity_type: &str,
    ) -> Result<Vec<ChangeVector>, RepoError>;

    /// 查询某类型资产的全部变更
    fn find_changes_of_type(&self, entity_type: &str) -> Result<Vec<ChangeVector>, RepoError> {
        self.find_changes_of_type_since(DateTime::<Utc>::MIN_UTC, entity_type)
    }

    /// 已存储的变更向量总数
    fn count(&self) -> Result<u64, RepoError>;
}

/// 带写入序号的变更向量
#[derive(Debug, Clone)]
pub(crate) struct StoredVector {
    pub(crate) sequence: u64,
    pub(crate) vector: ChangeVector,
}

/// 时间戳降序，同一时间戳内后写入的在前
pub(crate) fn newest_first(records: &mut [StoredVector]) {
    records.sort_by_key(|r| Reverse((*r.vector.timestamp(), r.sequence)));
}
