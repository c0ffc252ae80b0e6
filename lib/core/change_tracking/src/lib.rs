//! 资产变更追踪与最近活动排名
//!
//! ## 组成
//!
//! - **追踪**: 新建与更新资产时计算属性级变更，按批次写入变更日志
//! - **历史**: 按资产查询变更记录，按天聚合某类型资产的变更数
//! - **排名**: 最近编辑、最近评论（含“回应我的评论”和“我编辑过的”）
//!
//! 服务入口为 [`ChangeTrackingService`]。

pub mod adaptor;
pub mod config;
pub mod domain;
pub mod error;

pub use config::{ConfigError, TrackingConfig};
pub use domain::entity::{
    AggregatedChangeInfo, ChangeKind, RecentlyCommentedAsset, RecentlyModifiedAsset, User,
};
pub use domain::repository::{AssetLookup, AssetSummary, UserLookup};
pub use domain::service::{
    aggregate_by_day, resolve_label, Anonymous, ChangeRecordProvider, ChangeTracker,
    ChangeTrackingService, CurrentPrincipal, Principal, RecencyRanker, TrackingOutcome,
};
pub use error::{RankingError, TrackingError};
