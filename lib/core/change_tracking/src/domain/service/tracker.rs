use std::collections::HashSet;
use std::sync::Arc;

use asset_diff::{
    Asset, AttributeChange, AttributeClassifier, ChangeCalculator, ChangeVector, Iri,
    TimestampProvider,
};
use change_log_repo::ChangeLogRepo;

use super::principal::CurrentPrincipal;
use crate::config::TrackingConfig;
use crate::error::TrackingError;

/// 变更追踪结果
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingOutcome {
    /// 无变更，未写入
    NoChange,
    /// 该类型不记录创建事件，未写入
    Skipped,
    /// 已记录创建事件
    Created(ChangeVector),
    /// 已记录一个更新批次
    Updated(Vec<ChangeVector>),
}

impl TrackingOutcome {
    /// 检查是否写入了变更日志
    pub fn has_change(&self) -> bool {
        matches!(self, TrackingOutcome::Created(_) | TrackingOutcome::Updated(_))
    }

    /// 写入的变更向量
    pub fn vectors(&self) -> &[ChangeVector] {
        match self {
            TrackingOutcome::NoChange | TrackingOutcome::Skipped => &[],
            TrackingOutcome::Created(vector) => std::slice::from_ref(vector),
            TrackingOutcome::Updated(batch) => batch,
        }
    }
}

/// 变更追踪器
///
/// 新建资产时写入创建事件，更新资产时比较前后快照并写入一个批次。
/// 同一批次的全部记录使用同一时间戳和作者。
pub struct ChangeTracker {
    classifier: Arc<AttributeClassifier>,
    repo: Arc<dyn ChangeLogRepo>,
    clock: Arc<dyn TimestampProvider>,
    creation_excluded: HashSet<String>,
}

impl ChangeTracker {
    pub fn new(
        classifier: Arc<AttributeClassifier>,
        repo: Arc<dyn ChangeLogRepo>,
        clock: Arc<dyn TimestampProvider>,
        config: &TrackingConfig,
    ) -> Self {
        Self {
            classifier,
            repo,
            clock,
            creation_excluded: config.creation_excluded_types.iter().cloned().collect(),
        }
    }

    /// 记录资产创建
    ///
    /// # 返回
    /// - `Ok(Created)`: 已写入一条创建事件
    /// - `Ok(Skipped)`: 该类型不记录创建事件
    /// - `Err(UnresolvedPrincipal)`: 无法确定当前用户，未写入
    /// - `Err(Diff(UnknownAssetType))`: 资产类型未注册
    /// - `Err(Repo)`: 写入失败
    pub fn record_add(
        &self,
        principal: &dyn CurrentPrincipal,
        asset: &dyn Asset,
    ) -> Result<TrackingOutcome, TrackingError> {
        let author = resolve_author(principal)?;
        let schema = self.classifier.classify(asset.asset_type())?;

        if !schema.track_creation() || self.creation_excluded.contains(asset.asset_type()) {
            tracing::debug!(
                asset = %asset.asset_id(),
                asset_type = asset.asset_type(),
                "creation not tracked for asset type"
            );
            return Ok(TrackingOutcome::Skipped);
        }

        let vector = AttributeChange::creation(asset.asset_type(), asset.asset_id())
            .stamp(self.clock.now(), &author);
        self.repo.append(std::slice::from_ref(&vector))?;

        tracing::info!(asset = %vector.entity_id(), author = %author, "recorded asset creation");
        Ok(TrackingOutcome::Created(vector))
    }

    /// 记录资产更新
    ///
    /// # 参数
    /// - `updated`: 更新后的快照
    /// - `original`: 更新前的快照（必须与 `updated` 是同一资产）
    ///
    /// # 返回
    /// - `Ok(NoChange)`: 没有属性变化，不访问变更日志
    /// - `Ok(Updated(batch))`: 每个变化的属性一条记录，整体写入
    pub fn record_update(
        &self,
        principal: &dyn CurrentPrincipal,
        updated: &dyn Asset,
        original: &dyn Asset,
    ) -> Result<TrackingOutcome, TrackingError> {
        let author = resolve_author(principal)?;
        let schema = self.classifier.classify(updated.asset_type())?;
        let changes = ChangeCalculator::calculate(schema, original, updated)?;

        if changes.is_empty() {
            tracing::debug!(asset = %updated.asset_id(), "no attribute changes detected");
            return Ok(TrackingOutcome::NoChange);
        }

        let timestamp = self.clock.now();
        let batch: Vec<ChangeVector> =
            changes.into_iter().map(|change| change.stamp(timestamp, &author)).collect();
        self.repo.append(&batch)?;

        tracing::info!(
            asset = %updated.asset_id(),
            author = %author,
            changes = batch.len(),
            "recorded asset update"
        );
        Ok(TrackingOutcome::Updated(batch))
    }
}

fn resolve_author(principal: &dyn CurrentPrincipal) -> Result<Iri, TrackingError> {
    principal.author_id().ok_or(TrackingError::UnresolvedPrincipal)
}
