use asset_diff::Iri;

use crate::domain::entity::User;

/// 当前操作者
///
/// 由调用方显式传入追踪器，不依赖线程上下文。
pub trait CurrentPrincipal {
    /// 操作者标识，无法确定时返回 `None`
    fn author_id(&self) -> Option<Iri>;
}

/// 已认证的操作者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: Iri,
}

impl Principal {
    pub fn new(id: impl Into<Iri>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &Iri {
        &self.id
    }
}

impl CurrentPrincipal for Principal {
    fn author_id(&self) -> Option<Iri> {
        Some(self.id.clone())
    }
}

impl CurrentPrincipal for User {
    fn author_id(&self) -> Option<Iri> {
        Some(self.id.clone())
    }
}

/// 未认证（匿名）操作者
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CurrentPrincipal for Anonymous {
    fn author_id(&self) -> Option<Iri> {
        None
    }
}
