use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use asset_diff::{ChangeVector, Iri};
use change_log_repo::{ChangeLogRepo, Comment, CommentRepo};
use chrono::{DateTime, Utc};

use super::label::resolve_label;
use crate::config::TrackingConfig;
use crate::domain::entity::{ChangeKind, RecentlyCommentedAsset, RecentlyModifiedAsset};
use crate::domain::repository::{AssetLookup, AssetSummary, UserLookup};
use crate::error::RankingError;

/// 最近活动排名
///
/// 最近编辑：扫描按时间降序的变更流，每个资产只保留第一次出现（即最近一次）的记录，
/// 保留到 `limit` 个不同资产后停止。
///
/// 最近评论：每个资产取有效时间最大的评论（时间相同取 id 最小者），
/// 再按该时间降序排列（时间相同按资产 id 升序）后截断。
///
/// 每次查询使用自己的去重集合，可并发调用。
pub struct RecencyRanker {
    change_log: Arc<dyn ChangeLogRepo>,
    comments: Arc<dyn CommentRepo>,
    assets: Arc<dyn AssetLookup>,
    users: Arc<dyn UserLookup>,
    default_language: String,
}

/// 评论排名候选
struct Candidate<'a> {
    asset: &'a Iri,
    rank_time: DateTime<Utc>,
    last: &'a Comment,
    mine: Option<&'a Comment>,
}

impl RecencyRanker {
    pub fn new(
        change_log: Arc<dyn ChangeLogRepo>,
        comments: Arc<dyn CommentRepo>,
        assets: Arc<dyn AssetLookup>,
        users: Arc<dyn UserLookup>,
        config: &TrackingConfig,
    ) -> Self {
        Self {
            change_log,
            comments,
            assets,
            users,
            default_language: config.default_language.clone(),
        }
    }

    // ========================================================================
    // 最近编辑
    // ========================================================================

    /// 最近编辑的 `limit` 个资产，最近的在前
    pub fn find_last_edited(
        &self,
        asset_type: &str,
        limit: usize,
    ) -> Result<Vec<RecentlyModifiedAsset>, RankingError> {
        let feed = self.change_log.find_changes_of_type(asset_type)?;
        let latest = latest_per_entity(feed.iter(), limit);
        tracing::debug!(asset_type, scanned = feed.len(), kept = latest.len(), "ranked last edited");
        latest.into_iter().map(|vector| self.recently_modified(vector)).collect()
    }

    /// `author` 最近编辑的 `limit` 个资产
    ///
    /// 先按作者过滤再去重，返回的时间是该作者自己最近一次编辑的时间。
    pub fn find_last_edited_by(
        &self,
        asset_type: &str,
        author: &Iri,
        limit: usize,
    ) -> Result<Vec<RecentlyModifiedAsset>, RankingError> {
        let feed = self.change_log.find_changes_of_type(asset_type)?;
        let latest =
            latest_per_entity(feed.iter().filter(|vector| vector.author_id() == author), limit);
        tracing::debug!(
            asset_type,
            author = %author,
            kept = latest.len(),
            "ranked last edited by author"
        );
        latest.into_iter().map(|vector| self.recently_modified(vector)).collect()
    }

    // ========================================================================
    // 最近评论
    // ========================================================================

    /// 最近有评论的 `limit` 个资产，附带每个资产上最近的评论
    pub fn find_last_commented(
        &self,
        asset_type: &str,
        limit: usize,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        let comments = self.comments.find_comments_on_type(asset_type)?;
        let candidates = latest_comment_per_asset(comments.iter())
            .into_iter()
            .map(|(asset, last)| Candidate {
                asset,
                rank_time: last.effective_timestamp(),
                last,
                mine: None,
            })
            .collect();
        self.recently_commented(asset_type, top_candidates(candidates, limit))
    }

    /// 别人在 `author` 评论之后又评论了的资产
    ///
    /// 只考虑 `author` 评论过的资产；若 `author` 的最新评论就是资产上的最新评论则排除。
    /// 按 `author` 在该资产上最新评论的时间排名，结果同时附带两条评论。
    pub fn find_last_commented_in_reaction(
        &self,
        asset_type: &str,
        author: &Iri,
        limit: usize,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        let comments = self.comments.find_comments_on_type(asset_type)?;
        let overall = latest_comment_per_asset(comments.iter());
        let mine = latest_comment_per_asset(comments.iter().filter(|c| c.author() == author));

        let candidates = mine
            .into_iter()
            .filter_map(|(asset, my_last)| {
                let last = *overall.get(asset)?;
                (last.id() != my_last.id()).then(|| Candidate {
                    asset,
                    rank_time: my_last.effective_timestamp(),
                    last,
                    mine: Some(my_last),
                })
            })
            .collect();
        self.recently_commented(asset_type, top_candidates(candidates, limit))
    }

    /// `author` 编辑过的资产中最近有评论的
    pub fn find_my_last_commented(
        &self,
        asset_type: &str,
        author: &Iri,
        limit: usize,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        let edited: HashSet<Iri> = self
            .change_log
            .find_changes_of_type(asset_type)?
            .into_iter()
            .filter(|vector| vector.author_id() == author)
            .map(|vector| vector.entity_id().clone())
            .collect();

        let comments = self.comments.find_comments_on_type(asset_type)?;
        let candidates =
            latest_comment_per_asset(comments.iter().filter(|c| edited.contains(c.asset())))
                .into_iter()
                .map(|(asset, last)| Candidate {
                    asset,
                    rank_time: last.effective_timestamp(),
                    last,
                    mine: None,
                })
                .collect();
        self.recently_commented(asset_type, top_candidates(candidates, limit))
    }

    // ========================================================================
    // 结果组装
    // ========================================================================

    fn find_summary(
        &self,
        asset_type: &str,
        id: &Iri,
    ) -> Result<Option<AssetSummary>, RankingError> {
        self.assets
            .find_asset(asset_type, id)
            .map_err(|source| RankingError::Lookup { id: id.clone(), source })
    }

    fn label_of(&self, id: &Iri, summary: Option<&AssetSummary>) -> String {
        resolve_label(id, summary.and_then(|s| s.label.as_ref()), &self.default_language)
    }

    fn recently_modified(
        &self,
        vector: &ChangeVector,
    ) -> Result<RecentlyModifiedAsset, RankingError> {
        let id = vector.entity_id();
        let summary = self.find_summary(vector.entity_type(), id)?;
        let editor = self
            .users
            .find_user(vector.author_id())
            .map_err(|source| RankingError::Lookup { id: vector.author_id().clone(), source })?;
        if editor.is_none() {
            tracing::debug!(author = %vector.author_id(), "editor not found");
        }

        Ok(RecentlyModifiedAsset {
            id: id.clone(),
            label: self.label_of(id, summary.as_ref()),
            asset_type: vector.entity_type().clone(),
            modified: *vector.timestamp(),
            modified_by: vector.author_id().clone(),
            editor,
            change_kinds: BTreeSet::from([ChangeKind::of(vector)]),
            vocabulary: summary.and_then(|s| s.vocabulary),
        })
    }

    fn recently_commented(
        &self,
        asset_type: &str,
        candidates: Vec<Candidate<'_>>,
    ) -> Result<Vec<RecentlyCommentedAsset>, RankingError> {
        candidates
            .into_iter()
            .map(|candidate| {
                let summary = self.find_summary(asset_type, candidate.asset)?;
                Ok(RecentlyCommentedAsset {
                    id: candidate.asset.clone(),
                    label: self.label_of(candidate.asset, summary.as_ref()),
                    asset_type: asset_type.to_string(),
                    last_commented: candidate.rank_time,
                    change_kinds: BTreeSet::from([ChangeKind::Comment]),
                    last_comment: candidate.last.clone(),
                    my_last_comment: candidate.mine.cloned(),
                    vocabulary: summary.and_then(|s| s.vocabulary),
                })
            })
            .collect()
    }
}

// ============================================================================
// 排名算法
// ============================================================================

/// 每个资产保留变更流中第一次出现的记录，最多 `limit` 个
///
/// 输入必须已按时间降序；保留到 `limit` 个后停止读取。
fn latest_per_entity<'a>(
    feed: impl Iterator<Item = &'a ChangeVector>,
    limit: usize,
) -> Vec<&'a ChangeVector> {
    let mut seen: HashSet<&Iri> = HashSet::new();
    feed.filter(|&vector| seen.insert(vector.entity_id())).take(limit).collect()
}

/// `candidate` 是否比 `current` 更新（时间相同取 id 较小者）
fn is_later(candidate: &Comment, current: &Comment) -> bool {
    let (a, b) = (candidate.effective_timestamp(), current.effective_timestamp());
    a > b || (a == b && candidate.id() < current.id())
}

/// 每个资产上最新的评论
fn latest_comment_per_asset<'a>(
    comments: impl Iterator<Item = &'a Comment>,
) -> HashMap<&'a Iri, &'a Comment> {
    let mut latest: HashMap<&Iri, &Comment> = HashMap::new();
    for comment in comments {
        latest
            .entry(comment.asset())
            .and_modify(|current| {
                if is_later(comment, current) {
                    *current = comment;
                }
            })
            .or_insert(comment);
    }
    latest
}

/// 按排名时间降序（相同按资产 id 升序）取前 `limit` 个
fn top_candidates(mut candidates: Vec<Candidate<'_>>, limit: usize) -> Vec<Candidate<'_>> {
    candidates.sort_by(|a, b| b.rank_time.cmp(&a.rank_time).then_with(|| a.asset.cmp(b.asset)));
    candidates.truncate(limit);
    candidates
}
