pub mod diff;
pub use diff::{asset_types, calculator, change_vector, classifier, clock, error};
// 重新导出核心类型，方便使用
pub use diff::asset_types::{
    // 资产模型
    Asset,
    AssetClass,
    // 属性描述
    AttributeDescriptor,
    AttributeShape,
    AttributeValue,
    HasIdentifier,
    Iri,
    Literal,
    MultilingualString,
    PropertyField,
    ToLiteral,
};
pub use diff::calculator::ChangeCalculator;
pub use diff::change_vector::{
    AttributeChange, AttributeName, ChangeVector, PreviousValue, CREATION_ATTRIBUTE,
};
pub use diff::classifier::{AssetSchema, AttributeClassifier, ClassifierBuilder};
pub use diff::clock::{
    AtomicSequenceGenerator, FixedTimestampProvider, SequenceGenerator, SystemTimestampProvider,
    TimestampProvider,
};
pub use diff::error::DiffError;

// Asset derive 宏从 asset_derive crate 导入
// 使用方法: #[derive(asset_derive::Asset)]
