use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// 标识符与字面量
// ============================================================================

/// 资源标识符（IRI）
///
/// 作为不透明字符串处理，只比较是否相等，不做规范化。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iri(String);

impl Iri {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Iri {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Iri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// 多语言字符串（语言标签 -> 文本）
///
/// 比较时按结构整体比较：任意一个语言的文本不同即视为不同。
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultilingualString(BTreeMap<String, String>);

impl MultilingualString {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 创建只包含一个语言的多语言字符串
    pub fn create(value: impl Into<String>, language: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.set(language, value);
        result
    }

    /// 追加一个语言的翻译（链式调用）
    pub fn with(mut self, language: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(language, value);
        self
    }

    pub fn set(&mut self, language: impl Into<String>, value: impl Into<String>) {
        self.0.insert(language.into(), value.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for MultilingualString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered =
            self.0.iter().map(|(lang, value)| format!("{value}@{lang}")).collect::<Vec<_>>();
        write!(f, "[{}]", rendered.join(", "))
    }
}

/// 字面量值
///
/// 实现 `Ord` 以便放入 `BTreeSet`，集合比较与顺序无关且结果可复现。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// 普通字符串
    Text(String),
    /// 带语言标签的单语言字符串
    LangText { value: String, lang: String },
    /// 多语言字符串
    Multilingual(MultilingualString),
    Integer(i64),
    Boolean(bool),
    /// 时间点
    Instant(DateTime<Utc>),
    /// 以字面量形式出现的 IRI（例如外部链接）
    Iri(Iri),
}

impl Literal {
    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }

    #[inline]
    pub fn lang_text(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Literal::LangText { value: value.into(), lang: lang.into() }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(value) => f.write_str(value),
            Literal::LangText { value, lang } => write!(f, "{value}@{lang}"),
            Literal::Multilingual(value) => write!(f, "{value}"),
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Boolean(value) => write!(f, "{value}"),
            Literal::Instant(value) => {
                f.write_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Literal::Iri(value) => write!(f, "<{value}>"),
        }
    }
}

// ============================================================================
// 字段值转换 Trait（由 derive 生成的代码调用）
// ============================================================================

/// 将字段值转换为字面量
pub trait ToLiteral {
    fn to_literal(&self) -> Literal;
}

impl ToLiteral for Literal {
    fn to_literal(&self) -> Literal {
        self.clone()
    }
}

impl ToLiteral for String {
    fn to_literal(&self) -> Literal {
        Literal::Text(self.clone())
    }
}

impl ToLiteral for MultilingualString {
    fn to_literal(&self) -> Literal {
        Literal::Multilingual(self.clone())
    }
}

impl ToLiteral for i64 {
    fn to_literal(&self) -> Literal {
        Literal::Integer(*self)
    }
}

impl ToLiteral for i32 {
    fn to_literal(&self) -> Literal {
        Literal::Integer(i64::from(*self))
    }
}

impl ToLiteral for bool {
    fn to_literal(&self) -> Literal {
        Literal::Boolean(*self)
    }
}

impl ToLiteral for DateTime<Utc> {
    fn to_literal(&self) -> Literal {
        Literal::Instant(*self)
    }
}

impl ToLiteral for Iri {
    fn to_literal(&self) -> Literal {
        Literal::Iri(self.clone())
    }
}

/// 可以提供标识符的值：IRI 本身，或被引用的资产
///
/// 引用属性只比较标识符，被引用资产的其它内容不参与比较。
pub trait HasIdentifier {
    fn identifier(&self) -> Iri;
}

impl HasIdentifier for Iri {
    fn identifier(&self) -> Iri {
        self.clone()
    }
}

impl HasIdentifier for String {
    fn identifier(&self) -> Iri {
        Iri::new(self.as_str())
    }
}

/// 动态属性表（属性 IRI -> 值集合）
pub trait PropertyField {
    /// 返回规范化后的属性表，值集合为空的键被去掉
    fn properties(&self) -> BTreeMap<Iri, BTreeSet<Literal>>;
}

impl PropertyField for BTreeMap<Iri, BTreeSet<Literal>> {
    fn properties(&self) -> BTreeMap<Iri, BTreeSet<Literal>> {
        self.iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| (key.clone(), values.clone()))
            .collect()
    }
}

impl PropertyField for HashMap<String, HashSet<String>> {
    fn properties(&self) -> BTreeMap<Iri, BTreeSet<Literal>> {
        self.iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, values)| {
                (Iri::new(key.as_str()), values.iter().map(ToLiteral::to_literal).collect())
            })
            .collect()
    }
}

impl<P: PropertyField> PropertyField for Option<P> {
    fn properties(&self) -> BTreeMap<Iri, BTreeSet<Literal>> {
        self.as_ref().map(PropertyField::properties).unwrap_or_default()
    }
}

// ============================================================================
// 属性形状与属性值
// ============================================================================

/// 属性形状
///
/// 决定属性如何比较，以及变更向量中记录哪种旧值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeShape {
    /// 单值字面量（含多语言字符串）
    SingularLiteral,
    /// 单值对象引用
    SingularReference,
    /// 多值字面量
    PluralLiteral,
    /// 多值对象引用
    PluralReference,
    /// 直接以 IRI 表示的引用
    IdentifierReference { plural: bool },
    /// 资产的类型集合
    TypeSet,
    /// 未在模型中声明的动态属性表
    DynamicProperty,
    /// 推导属性，不做变更追踪
    Inferred,
}

impl AttributeShape {
    #[inline]
    pub fn is_tracked(&self) -> bool {
        !matches!(self, AttributeShape::Inferred)
    }

    #[inline]
    pub fn is_plural(&self) -> bool {
        matches!(
            self,
            AttributeShape::PluralLiteral
                | AttributeShape::PluralReference
                | AttributeShape::IdentifierReference { plural: true }
                | AttributeShape::TypeSet
        )
    }
}

/// 属性描述（名称 + 形状）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    /// 属性 IRI（通常为静态字符串）
    pub name: Cow<'static, str>,
    pub shape: AttributeShape,
}

impl AttributeDescriptor {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>, shape: AttributeShape) -> Self {
        Self { name: name.into(), shape }
    }

    /// 静态属性名，零分配（derive 生成的代码使用）
    #[inline]
    pub const fn new_static(name: &'static str, shape: AttributeShape) -> Self {
        Self { name: Cow::Borrowed(name), shape }
    }
}

/// 资产报告的属性值
///
/// 单值属性的缺失用 `None` 表示，多值属性的缺失用空集合表示，两者在比较时等价于“无值”。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Literal(Option<Literal>),
    Identifier(Option<Iri>),
    LiteralSet(BTreeSet<Literal>),
    IdentifierSet(BTreeSet<Iri>),
    Properties(BTreeMap<Iri, BTreeSet<Literal>>),
}

impl AttributeValue {
    /// 值类别名称（用于错误信息）
    pub fn kind(&self) -> &'static str {
        match self {
            AttributeValue::Literal(_) => "literal",
            AttributeValue::Identifier(_) => "identifier",
            AttributeValue::LiteralSet(_) => "literal set",
            AttributeValue::IdentifierSet(_) => "identifier set",
            AttributeValue::Properties(_) => "property map",
        }
    }
}

// ============================================================================
// 资产 Trait
// ============================================================================

/// 可追踪资产
///
/// 对象安全，追踪器和计算器通过 `&dyn Asset` 读取属性。
/// 通常由 `#[derive(asset_derive::Asset)]` 生成，也可以手写实现。
///
/// # 示例
/// ```ignore
/// #[derive(Debug, Clone, asset_derive::Asset)]
/// #[asset(type_iri = "http://example.org/Term", label = "label")]
/// pub struct Term {
///     id: Iri,
///     #[attr(iri = "http://www.w3.org/2004/02/skos/core#prefLabel", shape = "singular_literal")]
///     label: MultilingualString,
/// }
/// ```
pub trait Asset: Send + Sync {
    /// 资产标识符
    fn asset_id(&self) -> Iri;

    /// 资产类型 IRI
    fn asset_type(&self) -> &'static str;

    /// 按属性 IRI 读取属性值，未知属性返回 `None`
    fn attribute_value(&self, attribute: &str) -> Option<AttributeValue>;

    /// 资产标签（用于最近变更列表的展示）
    fn label(&self) -> Option<Literal> {
        None
    }
}

/// 资产类型的静态元数据，注册到属性分类器时使用
pub trait AssetClass: Asset + Sized {
    const TYPE_IRI: &'static str;

    /// 新建该类型资产时是否记录创建事件
    const TRACK_CREATION: bool = true;

    /// 该类型声明的全部属性（含推导属性）
    fn descriptors() -> Vec<AttributeDescriptor>;
}
