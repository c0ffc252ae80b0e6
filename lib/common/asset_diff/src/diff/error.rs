use thiserror::Error;

use super::asset_types::{AttributeShape, Iri};

// ============================================================================
// 错误类型
// ============================================================================

/// 变更计算与属性分类错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// 资产类型的属性声明不合法（注册时检出）
    #[error("invalid schema for asset type '{asset_type}': {reason}")]
    InvalidSchema { asset_type: String, reason: String },

    /// 资产类型未注册到分类器
    #[error("asset type '{0}' is not registered")]
    UnknownAssetType(String),

    /// 待比较的资产类型与分类结果不一致
    #[error("asset type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// 原始快照与更新快照的标识符不同
    #[error("identity mismatch: original {original}, updated {updated}")]
    IdentityMismatch { original: Iri, updated: Iri },

    /// 资产报告的属性值与声明的形状不符
    #[error("attribute '{attribute}' is declared {expected:?} but reported a {actual} value")]
    ShapeMismatch { attribute: String, expected: AttributeShape, actual: &'static str },
}

impl DiffError {
    pub(crate) fn invalid_schema(asset_type: &str, reason: impl Into<String>) -> Self {
        DiffError::InvalidSchema { asset_type: asset_type.to_string(), reason: reason.into() }
    }
}
