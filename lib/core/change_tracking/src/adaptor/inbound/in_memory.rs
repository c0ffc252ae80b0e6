use std::collections::HashMap;

use asset_diff::{Asset, Iri};
use change_log_repo::RepoError;
use parking_lot::RwLock;

use crate::domain::entity::User;
use crate::domain::repository::{AssetLookup, AssetSummary, UserLookup};

/// 内存资产查询
#[derive(Debug, Default)]
pub struct InMemoryAssetLookup {
    assets: RwLock<HashMap<(String, Iri), AssetSummary>>,
}

impl InMemoryAssetLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存资产摘要（同一资产重复保存时覆盖）
    pub fn save(&self, summary: AssetSummary) {
        self.assets.write().insert((summary.asset_type.clone(), summary.id.clone()), summary);
    }

    /// 保存资产快照的摘要
    pub fn save_asset(&self, asset: &dyn Asset) {
        self.save(AssetSummary::of(asset));
    }
}

impl AssetLookup for InMemoryAssetLookup {
    fn find_asset(&self, asset_type: &str, id: &Iri) -> Result<Option<AssetSummary>, RepoError> {
        Ok(self.assets.read().get(&(asset_type.to_string(), id.clone())).cloned())
    }
}

/// 内存用户查询
#[derive(Debug, Default)]
pub struct InMemoryUserLookup {
    users: RwLock<HashMap<Iri, User>>,
}

impl InMemoryUserLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self, user: User) {
        self.users.write().insert(user.id.clone(), user);
    }
}

impl UserLookup for InMemoryUserLookup {
    fn find_user(&self, id: &Iri) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().get(id).cloned())
    }
}
