use asset_diff::{AtomicSequenceGenerator, ChangeVector, Iri};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::core::change_log_repo::{newest_first, StoredVector};
use crate::{ChangeLogRepo, Comment, CommentRepo, RepoError};

/// 基于内存的变更日志仓储
///
/// 写锁内分配序号并追加整个批次，读者不会看到半个批次。
#[derive(Debug, Default)]
pub struct MemChangeLogRepo {
    records: RwLock<Vec<StoredVector>>,
    sequence: AtomicSequenceGenerator,
}

impl MemChangeLogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用已有记录初始化（按给定顺序视为写入顺序）
    pub fn with_records(records: impl IntoIterator<Item = ChangeVector>) -> Self {
        let repo = Self::new();
        repo.push_batch(records.into_iter().collect());
        repo
    }

    pub(crate) fn push_batch(&self, batch: Vec<ChangeVector>) {
        if batch.is_empty() {
            return;
        }
        let mut records = self.records.write();
        let first = self.sequence.next_batch(batch.len() as u64);
        records.extend(
            batch
                .into_iter()
                .enumerate()
                .map(|(offset, vector)| StoredVector { sequence: first + offset as u64, vector }),
        );
    }

    fn select(&self, predicate: impl Fn(&ChangeVector) -> bool) -> Vec<ChangeVector> {
        let mut matched: Vec<StoredVector> =
            self.records.read().iter().filter(|r| predicate(&r.vector)).cloned().collect();
        newest_first(&mut matched);
        matched.into_iter().map(|r| r.vector).collect()
    }
}

impl ChangeLogRepo for MemChangeLogRepo {
    fn append(&self, batch: &[ChangeVector]) -> Result<(), RepoError> {
        self.push_batch(batch.to_vec());
        Ok(())
    }

    fn find_all_for_entity(
        &self,
        entity_type: &str,
        entity_id: &Iri,
    ) -> Result<Vec<ChangeVector>, RepoError> {
        Ok(self.select(|v| v.entity_type() == entity_type && v.entity_id() == entity_id))
    }

    fn find_changes_of_type_since(
        &self,
        since: DateTime<Utc>,
        entity_type: &str,
    ) -> Result<Vec<ChangeVector>, RepoError> {
        Ok(self.select(|v| v.entity_type() == entity_type && *v.timestamp() >= since))
    }

    fn count(&self) -> Result<u64, RepoError> {
        Ok(self.records.read().len() as u64)
    }
}

/// 基于内存的评论仓储
#[derive(Debug, Default)]
pub struct MemCommentRepo {
    comments: RwLock<Vec<(String, Comment)>>,
}

impl MemCommentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条评论
    ///
    /// # 参数
    /// - `asset_type`: 被评论资产的类型 IRI
    /// - `comment`: 评论
    pub fn add_comment(&self, asset_type: &str, comment: Comment) {
        self.comments.write().push((asset_type.to_string(), comment));
    }
}

impl CommentRepo for MemCommentRepo {
    fn find_comments_on_type(&self, asset_type: &str) -> Result<Vec<Comment>, RepoError> {
        Ok(self
            .comments
            .read()
            .iter()
            .filter(|(t, _)| t == asset_type)
            .map(|(_, c)| c.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use asset_diff::AttributeChange;
    use chrono::TimeZone;

    use super::*;

    const TERM: &str = "http://example.org/Term";

    fn vector(entity: &str, secs: i64) -> ChangeVector {
        AttributeChange::creation(TERM, Iri::from(entity))
            .stamp(Utc.timestamp_opt(secs, 0).single().unwrap(), &Iri::from("u1"))
    }

    #[test]
    fn test_same_timestamp_orders_by_insertion() {
        let repo = MemChangeLogRepo::new();
        repo.append(&[vector("a", 10)]).unwrap();
        repo.append(&[vector("b", 10)]).unwrap();

        let feed = repo.find_changes_of_type(TERM).unwrap();
        let ids: Vec<_> = feed.iter().map(|v| v.entity_id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let repo = MemChangeLogRepo::new();
        repo.append(&[]).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }
}
