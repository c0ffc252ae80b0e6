use std::collections::{BTreeMap, BTreeSet};

use super::asset_types::{
    Asset, AttributeDescriptor, AttributeShape, AttributeValue, Iri, Literal,
};
use super::change_vector::{AttributeChange, AttributeName, PreviousValue};
use super::classifier::AssetSchema;
use super::error::DiffError;

/// 变更计算器
///
/// 比较同一资产的两个快照，为每个取值发生变化的属性输出一条 `AttributeChange`。
/// 纯函数：不读时钟、不访问存储，输入相同则输出相同。
///
/// 比较规则：
/// - 单值字面量：值相等比较，多语言字符串按整体结构比较
/// - 单值引用：只比较被引用对象的标识符
/// - 多值属性：集合相等（与顺序无关），空集合与缺失等价
/// - 动态属性表：逐个键比较，每个变化的键各产生一条记录
/// - 推导属性：跳过
///
/// # 示例
/// ```ignore
/// let schema = classifier.classify(original.asset_type())?;
/// let changes = ChangeCalculator::calculate(schema, &original, &updated)?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeCalculator;

impl ChangeCalculator {
    pub fn calculate(
        schema: &AssetSchema,
        original: &dyn Asset,
        updated: &dyn Asset,
    ) -> Result<Vec<AttributeChange>, DiffError> {
        for asset in [original, updated] {
            if asset.asset_type() != schema.asset_type() {
                return Err(DiffError::TypeMismatch {
                    expected: schema.asset_type().to_string(),
                    actual: asset.asset_type().to_string(),
                });
            }
        }

        let entity_id = original.asset_id();
        let updated_id = updated.asset_id();
        if entity_id != updated_id {
            return Err(DiffError::IdentityMismatch { original: entity_id, updated: updated_id });
        }

        let mut changes = Vec::new();
        for descriptor in schema.tracked_attributes() {
            let before = original.attribute_value(&descriptor.name);
            let after = updated.attribute_value(&descriptor.name);

            if descriptor.shape == AttributeShape::DynamicProperty {
                let before = expect_properties(descriptor, before)?;
                let after = expect_properties(descriptor, after)?;
                for (key, previous) in property_changes(&before, &after) {
                    changes.push(AttributeChange::new(
                        schema.asset_type(),
                        entity_id.clone(),
                        AttributeName::Attribute(key),
                        previous,
                    ));
                }
                continue;
            }

            if let Some(previous) = compare_attribute(descriptor, before, after)? {
                changes.push(AttributeChange::new(
                    schema.asset_type(),
                    entity_id.clone(),
                    AttributeName::Attribute(Iri::new(descriptor.name.as_ref())),
                    previous,
                ));
            }
        }

        Ok(changes)
    }
}

/// 比较单个非动态属性
///
/// 返回 `Some(previous)` 表示有变化（`previous` 为 `None` 表示变更前无值）。
fn compare_attribute(
    descriptor: &AttributeDescriptor,
    before: Option<AttributeValue>,
    after: Option<AttributeValue>,
) -> Result<Option<Option<PreviousValue>>, DiffError> {
    let changed = match descriptor.shape {
        AttributeShape::SingularLiteral => {
            let before = expect_literal(descriptor, before)?;
            let after = expect_literal(descriptor, after)?;
            (before != after).then(|| before.map(PreviousValue::Literal))
        }
        AttributeShape::SingularReference
        | AttributeShape::IdentifierReference { plural: false } => {
            let before = expect_identifier(descriptor, before)?;
            let after = expect_identifier(descriptor, after)?;
            (before != after)
                .then(|| before.map(|id| PreviousValue::Identifiers(BTreeSet::from([id]))))
        }
        AttributeShape::PluralLiteral => {
            let before = expect_literal_set(descriptor, before)?;
            let after = expect_literal_set(descriptor, after)?;
            (before != after).then(|| non_empty(before).map(PreviousValue::Literals))
        }
        AttributeShape::PluralReference
        | AttributeShape::IdentifierReference { plural: true }
        | AttributeShape::TypeSet => {
            let before = expect_identifier_set(descriptor, before)?;
            let after = expect_identifier_set(descriptor, after)?;
            (before != after).then(|| non_empty(before).map(PreviousValue::Identifiers))
        }
        AttributeShape::DynamicProperty | AttributeShape::Inferred => None,
    };
    Ok(changed)
}

/// 动态属性表逐键比较，按键排序输出
fn property_changes(
    before: &BTreeMap<Iri, BTreeSet<Literal>>,
    after: &BTreeMap<Iri, BTreeSet<Literal>>,
) -> Vec<(Iri, Option<PreviousValue>)> {
    let keys: BTreeSet<&Iri> = before.keys().chain(after.keys()).collect();
    keys.into_iter()
        .filter(|key| before.get(*key) != after.get(*key))
        .map(|key| (key.clone(), before.get(key).cloned().map(PreviousValue::Literals)))
        .collect()
}

fn non_empty<T: Ord>(set: BTreeSet<T>) -> Option<BTreeSet<T>> {
    (!set.is_empty()).then_some(set)
}

// ============================================================================
// 属性值形状检查
// ============================================================================

fn shape_mismatch(descriptor: &AttributeDescriptor, actual: &AttributeValue) -> DiffError {
    DiffError::ShapeMismatch {
        attribute: descriptor.name.to_string(),
        expected: descriptor.shape,
        actual: actual.kind(),
    }
}

fn expect_literal(
    descriptor: &AttributeDescriptor,
    value: Option<AttributeValue>,
) -> Result<Option<Literal>, DiffError> {
    match value {
        None => Ok(None),
        Some(AttributeValue::Literal(literal)) => Ok(literal),
        Some(other) => Err(shape_mismatch(descriptor, &other)),
    }
}

fn expect_identifier(
    descriptor: &AttributeDescriptor,
    value: Option<AttributeValue>,
) -> Result<Option<Iri>, DiffError> {
    match value {
        None => Ok(None),
        Some(AttributeValue::Identifier(id)) => Ok(id),
        Some(other) => Err(shape_mismatch(descriptor, &other)),
    }
}

fn expect_literal_set(
    descriptor: &AttributeDescriptor,
    value: Option<AttributeValue>,
) -> Result<BTreeSet<Literal>, DiffError> {
    match value {
        None => Ok(BTreeSet::new()),
        Some(AttributeValue::LiteralSet(set)) => Ok(set),
        Some(other) => Err(shape_mismatch(descriptor, &other)),
    }
}

fn expect_identifier_set(
    descriptor: &AttributeDescriptor,
    value: Option<AttributeValue>,
) -> Result<BTreeSet<Iri>, DiffError> {
    match value {
        None => Ok(BTreeSet::new()),
        Some(AttributeValue::IdentifierSet(set)) => Ok(set),
        Some(other) => Err(shape_mismatch(descriptor, &other)),
    }
}

fn expect_properties(
    descriptor: &AttributeDescriptor,
    value: Option<AttributeValue>,
) -> Result<BTreeMap<Iri, BTreeSet<Literal>>, DiffError> {
    match value {
        None => Ok(BTreeMap::new()),
        Some(AttributeValue::Properties(map)) => {
            Ok(map.into_iter().filter(|(_, values)| !values.is_empty()).collect())
        }
        Some(other) => Err(shape_mismatch(descriptor, &other)),
    }
}
