use std::sync::Arc;

use asset_diff::{Asset, AttributeClassifier, ChangeVector, Iri, SystemTimestampProvider};
use change_log_repo::{ChangeLogRepo, CommentRepo, RepoError};
use chrono::{DateTime, Utc};

use super::aggregation::aggregate_by_day;
use super::principal::CurrentPrincipal;
use super::ranking::RecencyRanker;
use super::tracker::{ChangeTracker, TrackingOutcome};
use crate::config::TrackingConfig;
use crate::domain::entity::{AggregatedChangeInfo, RecentlyCommentedAsset, RecentlyModifiedAsset};
use crate::domain::repository::{AssetLookup, UserLookup};
use crate::error::{RankingError, TrackingError};

/// 资产变更记录查询
pub trait ChangeRecordProvider {
    /// 资产的全部变更，最近的在前
    fn get_changes(&self, asset: &dyn Asset) -> Result<Vec<ChangeVector>, RepoError>;
}

/// 变更追踪服务
///
/// 组合追踪器、变更日志和排名，对外提供完整的追踪与查询入口。
///
/// # 示例
/// ```ignore
/// let config = TrackingConfig::load_from_file(Path::new("tracking.json"))?;
/// let classifier = AttributeClassifier::builder().register::<Term>()?.build();
/// let service = ChangeTrackingService::new(
///     &config,
///     Arc::new(classifier),
///     config.open_change_log()?,
///     comments,
///     assets,
///     users,
/// );
///
/// service.record_update(&principal, &updated, &original)?;
/// let recent = service.find_last_edited(Term::TYPE_IRI, 10)?;
/// ```
pub struct ChangeTrackingService {
    tracker: ChangeTracker,
    ranker: RecencyRanker,
    change_log: Arc<dyn ChangeLogRepo>,
}

impl ChangeTrackingService {
    /// 使用系统时钟创建服务
    pub fn new(
        config: &TrackingConfig,
        classifier: Arc<AttributeClassifier>,
        change_log: Arc<dyn ChangeLogRepo>,
        comments: Arc<dyn CommentRepo>,
        assets: Arc<dyn AssetLookup>,
        users: Arc<dyn UserLookup>,
    ) -> Self {
        let tracker = ChangeTracker::new(
            classifier,
            Arc::clone(&change_log),
            Arc::new(SystemTimestampProvider),
            config,
        );
        let ranker = RecencyRanker::new(Arc::clone(&change_log), comments, assets, users, config);
        Self::from_parts(tracker, ranker, change_log)
    }

    /// 由已构建的组件组装（测试中注入固定时钟）
    pub fn from_parts(
        tracker: ChangeTracker,
        ranker: RecencyRanker,
        change_log: Arc<dyn ChangeLogRepo>,
    ) -> Self {
        Self { tracker, ranker, change_log }
    }

    // ========================================================================
    // 追踪
    // ========================================================================

    pub fn record_add(
        &self,
        principal: &dyn CurrentPrincipal,
        asset: &dyn Asset,
    ) -> Result<TrackingOutcome, TrackingError> {
        self.tracker.record_add(principal, asset)
    }

    pub fn record_update(
        &self,
        principal: &dyn CurrentPrincipal,
        updated: &dyn Asset,
        original: &dyn Asset,
    ) -> Result<TrackingOutcome, TrackingError> {
        self.tracker.record_update(principal, updated, original)
    }

    // ========================================================================
    // 历史
    // ========================================================================

    /// 资产的变更历史，最近的在前
    pub fn get_change_history(&self, asset: &dyn Asset) -> Result<Vec<ChangeVector>, RepoError> {
        self.change_log.find_all_for_entity(asset.asset_type(), &asset.asset_id())
    }

    /// 某类型资产自 `since` 起每天的变更数，日期升序
    pub fn get_changes_of_type_by_day(
        &self,
        asset_type: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<AggregatedChangeInfo>, RepoError> {
        let vectors = self.change_log.find_changes_of_type_since(since, asset_type)?;
        Ok(aggregate_by_day(&vectors))
    }

    // ========================================================================
    // 排名
    // ========================================================================

    pub fn find_last_edited(
        &self,
        asset_type: &str,
        limit: usize,
    ) -> Result<Vec<RecentlyModifiedAsset>, RankingError> {
        self.ranker.find_last_edited(asset_type, limit)
    }

    pub fn find_last_edited_by(
        &self,
        asset_type: &str,
        author: &Iri,
        limit: usize,
    ) -> Result<Vec<RecentlyModifiedAsset>, RankingError> {
        self.ranker.find_last_edited_by(asset_type, author, limit)
    }

    pub fn find_last_commented(
        &self,
        asset_type: &str,
        limit: usize,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        self.ranker.find_last_commented(asset_type, limit)
    }

    pub fn find_last_commented_in_reaction(
        &self,
        asset_type: &str,
        author: &Iri,
        limit: usize,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        self.ranker.find_last_commented_in_reaction(asset_type, author, limit)
    }

    pub fn find_my_last_commented(
        &self,
        asset_type: &str,
        author: &Iri,
        limit: usize,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        self.ranker.find_my_last_commented(asset_type, author, limit)
    }
}

impl ChangeRecordProvider for ChangeTrackingService {
    fn get_changes(&self, asset: &dyn Asset) -> Result<Vec<ChangeVector>, RepoError> {
        self.get_change_history(asset)
    }
}
