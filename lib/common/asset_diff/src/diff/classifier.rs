use std::collections::{HashMap, HashSet};
use std::fmt;

use super::asset_types::{AssetClass, AttributeDescriptor, AttributeShape};
use super::error::DiffError;

// ============================================================================
// 资产类型结构
// ============================================================================

/// 单个资产类型的属性声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSchema {
    asset_type: String,
    track_creation: bool,
    attributes: Vec<AttributeDescriptor>,
}

impl AssetSchema {
    pub fn new(
        asset_type: impl Into<String>,
        track_creation: bool,
        attributes: Vec<AttributeDescriptor>,
    ) -> Self {
        Self { asset_type: asset_type.into(), track_creation, attributes }
    }

    /// 从 `AssetClass` 的静态元数据构建并校验
    pub fn of<A: AssetClass>() -> Result<Self, DiffError> {
        let schema = Self::new(A::TYPE_IRI, A::TRACK_CREATION, A::descriptors());
        schema.validate()?;
        Ok(schema)
    }

    #[inline]
    pub fn asset_type(&self) -> &str {
        &self.asset_type
    }

    #[inline]
    pub fn track_creation(&self) -> bool {
        self.track_creation
    }

    #[inline]
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// 参与变更追踪的属性（跳过推导属性）
    pub fn tracked_attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|d| d.shape.is_tracked())
    }

    /// 验证属性声明
    ///
    /// 检查：
    /// 1. 类型 IRI 不为空
    /// 2. 属性名不为空且唯一
    /// 3. 最多一个类型集合、一个动态属性表
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.asset_type.is_empty() {
            return Err(DiffError::invalid_schema("", "asset type IRI cannot be empty"));
        }

        let mut seen = HashSet::new();
        let mut type_sets = 0usize;
        let mut dynamic = 0usize;
        for descriptor in &self.attributes {
            if descriptor.name.is_empty() {
                return Err(DiffError::invalid_schema(
                    &self.asset_type,
                    "attribute name cannot be empty",
                ));
            }
            if !seen.insert(descriptor.name.as_ref()) {
                return Err(DiffError::invalid_schema(
                    &self.asset_type,
                    format!("duplicate attribute '{}'", descriptor.name),
                ));
            }
            match descriptor.shape {
                AttributeShape::TypeSet => type_sets += 1,
                AttributeShape::DynamicProperty => dynamic += 1,
                _ => {}
            }
        }

        if type_sets > 1 {
            return Err(DiffError::invalid_schema(
                &self.asset_type,
                "at most one type set may be declared",
            ));
        }

        if dynamic > 1 {
            return Err(DiffError::invalid_schema(
                &self.asset_type,
                "at most one dynamic property map may be declared",
            ));
        }

        Ok(())
    }

    /// 摘要信息
    pub fn summary(&self) -> String {
        let attribute_list = self
            .attributes
            .iter()
            .map(|d| format!("{}({:?})", d.name, d.shape))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Asset type '{}' with {} attributes: [{}]",
            self.asset_type,
            self.attributes.len(),
            attribute_list
        )
    }
}

impl fmt::Display for AssetSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

// ============================================================================
// 属性分类器
// ============================================================================

/// 属性分类器：资产类型 IRI -> 属性声明
///
/// 启动时一次性构建，之后只读，可在线程间共享。
///
/// # 示例
/// ```ignore
/// let classifier = AttributeClassifier::builder()
///     .register::<Term>()?
///     .register::<Vocabulary>()?
///     .build();
/// let schema = classifier.classify(Term::TYPE_IRI)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributeClassifier {
    schemas: HashMap<String, AssetSchema>,
}

impl AttributeClassifier {
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::default()
    }

    /// 查找资产类型的属性声明
    pub fn classify(&self, asset_type: &str) -> Result<&AssetSchema, DiffError> {
        self.schemas
            .get(asset_type)
            .ok_or_else(|| DiffError::UnknownAssetType(asset_type.to_string()))
    }

    /// 已注册的资产类型（排序后返回）
    pub fn asset_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// 分类器构建器
#[derive(Debug, Default)]
pub struct ClassifierBuilder {
    schemas: HashMap<String, AssetSchema>,
}

impl ClassifierBuilder {
    /// 注册一个资产类型
    pub fn register<A: AssetClass>(self) -> Result<Self, DiffError> {
        self.register_schema(AssetSchema::of::<A>()?)
    }

    /// 注册手工构建的属性声明
    pub fn register_schema(mut self, schema: AssetSchema) -> Result<Self, DiffError> {
        schema.validate()?;
        if self.schemas.contains_key(schema.asset_type()) {
            return Err(DiffError::invalid_schema(
                schema.asset_type(),
                "asset type registered twice",
            ));
        }
        self.schemas.insert(schema.asset_type().to_string(), schema);
        Ok(self)
    }

    pub fn build(self) -> AttributeClassifier {
        AttributeClassifier { schemas: self.schemas }
    }
}
