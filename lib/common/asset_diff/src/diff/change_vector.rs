use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use immutable_derive::immutable;
use serde::{Deserialize, Serialize};

use super::asset_types::{Iri, Literal};

/// 创建事件使用的属性名哨兵值
pub const CREATION_ATTRIBUTE: &str = "urn:change-tracking:creation";

// ============================================================================
// 属性名与旧值
// ============================================================================

/// 变更向量的属性名：创建哨兵或具体属性 IRI
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeName {
    Creation,
    Attribute(Iri),
}

impl AttributeName {
    pub fn as_str(&self) -> &str {
        match self {
            AttributeName::Creation => CREATION_ATTRIBUTE,
            AttributeName::Attribute(iri) => iri.as_str(),
        }
    }
}

impl From<String> for AttributeName {
    fn from(value: String) -> Self {
        if value == CREATION_ATTRIBUTE {
            AttributeName::Creation
        } else {
            AttributeName::Attribute(Iri::from(value))
        }
    }
}

impl From<AttributeName> for String {
    fn from(value: AttributeName) -> Self {
        match value {
            AttributeName::Creation => CREATION_ATTRIBUTE.to_string(),
            AttributeName::Attribute(iri) => iri.into_inner(),
        }
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 变更前的属性值
///
/// 单值引用也以单元素 `Identifiers` 集合记录，所有引用类属性的旧值形状一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PreviousValue {
    Literal(Literal),
    Literals(BTreeSet<Literal>),
    Identifiers(BTreeSet<Iri>),
}

// ============================================================================
// 变更记录
// ============================================================================

/// 计算器输出的单个属性变更（尚未打上时间戳和作者）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub entity_type: String,
    pub entity_id: Iri,
    pub attribute_name: AttributeName,
    pub previous_value: Option<PreviousValue>,
}

impl AttributeChange {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: Iri,
        attribute_name: AttributeName,
        previous_value: Option<PreviousValue>,
    ) -> Self {
        Self { entity_type: entity_type.into(), entity_id, attribute_name, previous_value }
    }

    /// 创建事件（无旧值）
    pub fn creation(entity_type: impl Into<String>, entity_id: Iri) -> Self {
        Self::new(entity_type, entity_id, AttributeName::Creation, None)
    }

    /// 打上时间戳和作者，生成可持久化的变更向量
    pub fn stamp(self, timestamp: DateTime<Utc>, author_id: &Iri) -> ChangeVector {
        ChangeVector::new(
            self.entity_type,
            self.entity_id,
            self.attribute_name,
            self.previous_value,
            timestamp,
            author_id.clone(),
        )
    }
}

/// 变更向量：持久化到变更日志的单条记录
///
/// 写入后不可修改。`previous_value` 为空时序列化结果中省略该字段。
#[immutable]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVector {
    /// 被变更资产的类型 IRI
    entity_type: String,
    /// 被变更资产的标识符
    entity_id: Iri,
    attribute_name: AttributeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous_value: Option<PreviousValue>,
    timestamp: DateTime<Utc>,
    /// 执行变更的用户
    author_id: Iri,
}

impl ChangeVector {
    #[inline]
    pub fn is_creation(&self) -> bool {
        self.attribute_name == AttributeName::Creation
    }
}
