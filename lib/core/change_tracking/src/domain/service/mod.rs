//! 领域服务

mod aggregation;
mod change_tracking_service;
mod label;
mod principal;
mod ranking;
mod tracker;

pub use aggregation::aggregate_by_day;
pub use change_tracking_service::{ChangeRecordProvider, ChangeTrackingService};
pub use label::resolve_label;
pub use principal::{Anonymous, CurrentPrincipal, Principal};
pub use ranking::RecencyRanker;
pub use tracker::{ChangeTracker, TrackingOutcome};
