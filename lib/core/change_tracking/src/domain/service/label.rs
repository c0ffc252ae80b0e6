use asset_diff::{Iri, Literal};

/// 解析展示用标签
///
/// - 单语言字符串原样返回
/// - 多语言字符串取 `language` 对应的值，缺失时记录警告并返回原始渲染
/// - 其它字面量记录警告并返回原始渲染
/// - 没有标签时记录警告并返回资产标识符
///
/// 永远不会失败。
pub fn resolve_label(asset_id: &Iri, label: Option<&Literal>, language: &str) -> String {
    match label {
        Some(Literal::Text(value)) | Some(Literal::LangText { value, .. }) => value.clone(),
        Some(Literal::Multilingual(values)) => match values.get(language) {
            Some(value) => value.to_string(),
            None => {
                tracing::warn!(
                    asset = %asset_id,
                    language,
                    "label has no translation in the default language"
                );
                values.to_string()
            }
        },
        Some(other) => {
            tracing::warn!(asset = %asset_id, label = %other, "unexpected label value");
            other.to_string()
        }
        None => {
            tracing::warn!(asset = %asset_id, "asset has no label");
            asset_id.to_string()
        }
    }
}
