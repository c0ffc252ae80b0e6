use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{
    parse_macro_input, Data, DeriveInput, Error, Expr, ExprLit, Field, Fields, Ident, Lit, LitStr,
    Meta, Token, Type,
};

/// Asset derive 宏 - 自动实现 `Asset`、`AssetClass` 和 `HasIdentifier`
///
/// # 结构体属性
/// - `#[asset(type_iri = "...")]` - 资产类型 IRI（默认为结构体名）
/// - `#[asset(id = "field_name")]` - 指定标识符字段（默认为 `id`）
/// - `#[asset(label = "field_name")]` - 指定标签字段
/// - `#[asset(skip_creation)]` - 新建该类型资产时不记录创建事件
///
/// # 字段属性
/// - `#[attr(iri = "...", shape = "...")]` - 声明追踪属性
/// - `#[attr(iri = "...", inferred)]` - 声明推导属性（不追踪）
///
/// 没有 `#[attr]` 的字段不参与变更追踪。
///
/// 支持的 shape：`singular_literal`、`singular_reference`、`plural_literal`、
/// `plural_reference`、`identifier`、`identifiers`、`types`、`properties`。
/// 未知 shape 产生编译错误。
///
/// 字段类型为 `Option<_>`、`Vec<_>`、`HashSet<_>`、`BTreeSet<_>` 时按容器遍历，
/// 其它类型视为单个值。`Option<Vec<_>>` 等可空集合展开遍历，`None` 与空集合等价。
///
/// # 示例
/// ```ignore
/// use asset_diff::{Iri, MultilingualString};
///
/// #[derive(Debug, Clone, asset_derive::Asset)]
/// #[asset(type_iri = "http://example.org/Term", label = "label")]
/// struct Term {
///     id: Iri,
///     #[attr(iri = "http://www.w3.org/2004/02/skos/core#prefLabel", shape = "singular_literal")]
///     label: MultilingualString,
///     #[attr(iri = "http://www.w3.org/2004/02/skos/core#broader", shape = "plural_reference")]
///     parents: HashSet<Term>,
///     #[attr(iri = "http://example.org/subTerms", inferred)]
///     sub_terms: Vec<Iri>,
/// }
/// ```
#[proc_macro_derive(Asset, attributes(asset, attr))]
pub fn derive_asset(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_asset(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// ============================================================================
// 解析结果
// ============================================================================

struct AssetOptions {
    type_iri: String,
    id_field: Ident,
    label_field: Option<Ident>,
    track_creation: bool,
}

#[derive(Clone, Copy)]
enum Shape {
    SingularLiteral,
    SingularReference,
    PluralLiteral,
    PluralReference,
    Identifier,
    Identifiers,
    Types,
    Properties,
    Inferred,
}

const SUPPORTED_SHAPES: &str = "singular_literal, singular_reference, plural_literal, \
    plural_reference, identifier, identifiers, types, properties";

impl Shape {
    fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "singular_literal" => Some(Shape::SingularLiteral),
            "singular_reference" => Some(Shape::SingularReference),
            "plural_literal" => Some(Shape::PluralLiteral),
            "plural_reference" => Some(Shape::PluralReference),
            "identifier" => Some(Shape::Identifier),
            "identifiers" => Some(Shape::Identifiers),
            "types" => Some(Shape::Types),
            "properties" => Some(Shape::Properties),
            _ => None,
        }
    }

    fn descriptor_tokens(self) -> TokenStream2 {
        match self {
            Shape::SingularLiteral => quote!(::asset_diff::AttributeShape::SingularLiteral),
            Shape::SingularReference => quote!(::asset_diff::AttributeShape::SingularReference),
            Shape::PluralLiteral => quote!(::asset_diff::AttributeShape::PluralLiteral),
            Shape::PluralReference => quote!(::asset_diff::AttributeShape::PluralReference),
            Shape::Identifier => {
                quote!(::asset_diff::AttributeShape::IdentifierReference { plural: false })
            }
            Shape::Identifiers => {
                quote!(::asset_diff::AttributeShape::IdentifierReference { plural: true })
            }
            Shape::Types => quote!(::asset_diff::AttributeShape::TypeSet),
            Shape::Properties => quote!(::asset_diff::AttributeShape::DynamicProperty),
            Shape::Inferred => quote!(::asset_diff::AttributeShape::Inferred),
        }
    }
}

/// 字段值的遍历方式
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Arity {
    Single,
    Container,
    /// `Option<集合>`
    OptionalCollection,
}

struct TrackedField {
    ident: Ident,
    iri: String,
    shape: Shape,
    arity: Arity,
}

// ============================================================================
// 代码生成
// ============================================================================

fn expand_asset(input: &DeriveInput) -> Result<TokenStream2, Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = named_fields(input)?;
    let options = parse_asset_options(input, fields)?;
    let tracked = parse_tracked_fields(fields)?;

    let type_iri = &options.type_iri;
    let track_creation = options.track_creation;
    let id_field = &options.id_field;

    let descriptors = tracked.iter().map(|field| {
        let iri = &field.iri;
        let shape = field.shape.descriptor_tokens();
        quote! { ::asset_diff::AttributeDescriptor::new_static(#iri, #shape) }
    });

    let value_arms = tracked.iter().filter_map(|field| {
        let iri = &field.iri;
        value_expr(field).map(|expr| quote! { #iri => ::std::option::Option::Some(#expr), })
    });

    let label_fn = options.label_field.as_ref().map(|label| {
        let values = field_values(label, field_arity(fields, label));
        quote! {
            fn label(&self) -> ::std::option::Option<::asset_diff::Literal> {
                #values.map(|v| ::asset_diff::ToLiteral::to_literal(v)).next()
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::asset_diff::Asset for #name #ty_generics #where_clause {
            fn asset_id(&self) -> ::asset_diff::Iri {
                ::asset_diff::HasIdentifier::identifier(&self.#id_field)
            }

            fn asset_type(&self) -> &'static str {
                <Self as ::asset_diff::AssetClass>::TYPE_IRI
            }

            #[allow(clippy::match_single_binding)]
            fn attribute_value(
                &self,
                attribute: &str,
            ) -> ::std::option::Option<::asset_diff::AttributeValue> {
                match attribute {
                    #(#value_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            #label_fn
        }

        impl #impl_generics ::asset_diff::AssetClass for #name #ty_generics #where_clause {
            const TYPE_IRI: &'static str = #type_iri;
            const TRACK_CREATION: bool = #track_creation;

            fn descriptors() -> ::std::vec::Vec<::asset_diff::AttributeDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }

        impl #impl_generics ::asset_diff::HasIdentifier for #name #ty_generics #where_clause {
            fn identifier(&self) -> ::asset_diff::Iri {
                ::asset_diff::HasIdentifier::identifier(&self.#id_field)
            }
        }
    })
}

/// 字段值迭代器：容器字段逐个遍历，其它字段视为单个值
fn field_values(ident: &Ident, arity: Arity) -> TokenStream2 {
    match arity {
        Arity::Single => quote! { ::std::iter::once(&self.#ident) },
        Arity::Container => quote! { (&self.#ident).into_iter() },
        Arity::OptionalCollection => quote! { self.#ident.iter().flatten() },
    }
}

/// 生成读取属性值的表达式，推导属性返回 `None`
fn value_expr(field: &TrackedField) -> Option<TokenStream2> {
    let ident = &field.ident;
    let values = field_values(ident, field.arity);
    let literal = quote! { |v| ::asset_diff::ToLiteral::to_literal(v) };
    let identifier = quote! { |v| ::asset_diff::HasIdentifier::identifier(v) };

    let expr = match field.shape {
        Shape::SingularLiteral => quote! {
            ::asset_diff::AttributeValue::Literal(#values.map(#literal).next())
        },
        Shape::SingularReference | Shape::Identifier => quote! {
            ::asset_diff::AttributeValue::Identifier(#values.map(#identifier).next())
        },
        Shape::PluralLiteral => quote! {
            ::asset_diff::AttributeValue::LiteralSet(#values.map(#literal).collect())
        },
        Shape::PluralReference | Shape::Identifiers | Shape::Types => quote! {
            ::asset_diff::AttributeValue::IdentifierSet(#values.map(#identifier).collect())
        },
        Shape::Properties => quote! {
            ::asset_diff::AttributeValue::Properties(
                ::asset_diff::PropertyField::properties(&self.#ident)
            )
        },
        Shape::Inferred => return None,
    };
    Some(expr)
}

// ============================================================================
// 属性解析
// ============================================================================

fn named_fields(input: &DeriveInput) -> Result<&Punctuated<Field, Comma>, Error> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(Error::new_spanned(&input.ident, "#[derive(Asset)] 只支持具名字段的结构体")),
        },
        _ => Err(Error::new_spanned(&input.ident, "#[derive(Asset)] 只支持结构体")),
    }
}

fn lit_str(expr: &Expr) -> Result<&LitStr, Error> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Ok(s),
        other => Err(Error::new_spanned(other, "expected a string literal")),
    }
}

fn has_field(fields: &Punctuated<Field, Comma>, ident: &Ident) -> bool {
    fields.iter().any(|f| f.ident.as_ref() == Some(ident))
}

/// 解析 `#[asset(...)]`
fn parse_asset_options(
    input: &DeriveInput,
    fields: &Punctuated<Field, Comma>,
) -> Result<AssetOptions, Error> {
    let mut options = AssetOptions {
        type_iri: input.ident.to_string(),
        id_field: Ident::new("id", input.ident.span()),
        label_field: None,
        track_creation: true,
    };

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("asset")) {
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in metas {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("type_iri") => {
                    options.type_iri = lit_str(&nv.value)?.value();
                }
                Meta::NameValue(nv) if nv.path.is_ident("id") => {
                    let s = lit_str(&nv.value)?;
                    options.id_field = Ident::new(&s.value(), s.span());
                }
                Meta::NameValue(nv) if nv.path.is_ident("label") => {
                    let s = lit_str(&nv.value)?;
                    options.label_field = Some(Ident::new(&s.value(), s.span()));
                }
                Meta::Path(path) if path.is_ident("skip_creation") => {
                    options.track_creation = false;
                }
                _ => {
                    return Err(Error::new_spanned(
                        &meta,
                        "unsupported #[asset] option, expected type_iri, id, label or skip_creation",
                    ))
                }
            }
        }
    }

    if !has_field(fields, &options.id_field) {
        return Err(Error::new_spanned(
            &options.id_field,
            format!("identifier field `{}` not found", options.id_field),
        ));
    }
    if let Some(label) = &options.label_field {
        if !has_field(fields, label) {
            return Err(Error::new_spanned(label, format!("label field `{label}` not found")));
        }
    }

    Ok(options)
}

/// 解析字段上的 `#[attr(...)]`
fn parse_tracked_fields(fields: &Punctuated<Field, Comma>) -> Result<Vec<TrackedField>, Error> {
    let mut tracked = Vec::new();
    let mut seen = HashSet::new();

    for field in fields {
        let Some(ident) = &field.ident else { continue };
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("attr")) {
            let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            let mut iri = None;
            let mut shape = None;

            for meta in metas {
                match &meta {
                    Meta::NameValue(nv) if nv.path.is_ident("iri") => {
                        iri = Some(lit_str(&nv.value)?.value());
                    }
                    Meta::NameValue(nv) if nv.path.is_ident("shape") => {
                        let keyword = lit_str(&nv.value)?;
                        shape = Some(Shape::parse(&keyword.value()).ok_or_else(|| {
                            Error::new_spanned(
                                keyword,
                                format!(
                                    "unknown attribute shape `{}`, expected one of: {SUPPORTED_SHAPES}",
                                    keyword.value()
                                ),
                            )
                        })?);
                    }
                    Meta::Path(path) if path.is_ident("inferred") => {
                        shape = Some(Shape::Inferred);
                    }
                    _ => {
                        return Err(Error::new_spanned(
                            &meta,
                            "unsupported #[attr] option, expected iri, shape or inferred",
                        ))
                    }
                }
            }

            let iri = iri.ok_or_else(|| Error::new_spanned(attr, "#[attr] requires `iri`"))?;
            let shape = shape.ok_or_else(|| {
                Error::new_spanned(attr, "#[attr] requires `shape = \"...\"` or `inferred`")
            })?;
            if !seen.insert(iri.clone()) {
                return Err(Error::new_spanned(attr, format!("attribute `{iri}` declared twice")));
            }

            tracked.push(TrackedField {
                ident: ident.clone(),
                iri,
                shape,
                arity: arity_of(&field.ty),
            });
        }
    }

    Ok(tracked)
}

fn field_arity(fields: &Punctuated<Field, Comma>, ident: &Ident) -> Arity {
    fields
        .iter()
        .find(|f| f.ident.as_ref() == Some(ident))
        .map_or(Arity::Single, |f| arity_of(&f.ty))
}

/// 按类型字符串判断遍历方式
fn arity_of(ty: &Type) -> Arity {
    let type_str = quote!(#ty).to_string().replace(' ', "");
    let mut heads = type_str.split('<').map(|head| head.rsplit("::").next().unwrap_or(head));
    match (heads.next(), heads.next()) {
        (Some("Option"), Some("Vec" | "HashSet" | "BTreeSet")) => Arity::OptionalCollection,
        (Some("Option" | "Vec" | "HashSet" | "BTreeSet"), _) => Arity::Container,
        _ => Arity::Single,
    }
}
