use asset_diff::Iri;
use serde::{Deserialize, Serialize};

/// 用户（最近编辑列表中的编辑者）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: Iri,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl User {
    pub fn new(
        id: impl Into<Iri>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: username.into(),
        }
    }
}
