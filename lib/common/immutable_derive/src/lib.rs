use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, Visibility};

/// 不可变记录属性宏
///
/// 变更向量、评论等一旦写入日志就不再修改的记录使用此宏：
/// - 生成 `pub const fn new`，参数顺序与字段声明顺序一致
/// - 为每个字段生成返回不可变引用的 const getter
/// - 拒绝 `pub` 字段，写入后只能通过 getter 读取
///
/// 违反约束时生成编译错误（指向出错的字段），而不是在宏展开时 panic。
///
/// # 示例
/// ```ignore
/// #[immutable]
/// #[derive(Debug, Clone)]
/// pub struct Revision {
///     entity_id: Iri,
///     timestamp: DateTime<Utc>,
/// }
///
/// let revision = Revision::new(iri, Utc::now());
/// assert_eq!(revision.entity_id(), &iri);
/// ```
#[proc_macro_attribute]
pub fn immutable(_args: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_immutable(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_immutable(input: &DeriveInput) -> Result<TokenStream2, Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    name,
                    "#[immutable] 只支持具名字段的结构体",
                ))
            }
        },
        _ => return Err(Error::new_spanned(name, "#[immutable] 只支持结构体")),
    };

    let mut names = Vec::with_capacity(fields.len());
    let mut types = Vec::with_capacity(fields.len());
    for field in fields {
        if matches!(field.vis, Visibility::Public(_)) {
            return Err(Error::new_spanned(
                &field.vis,
                "#[immutable] 记录的字段必须是私有的，请移除 `pub` 并通过生成的 getter 访问",
            ));
        }
        // 具名字段一定带 ident
        if let Some(ident) = &field.ident {
            names.push(ident);
            types.push(&field.ty);
        }
    }

    let getters = names.iter().zip(types.iter()).map(|(field_name, field_type)| {
        quote! {
            #[inline]
            #[must_use]
            pub const fn #field_name(&self) -> &#field_type {
                &self.#field_name
            }
        }
    });

    Ok(quote! {
        #input

        impl #impl_generics #name #ty_generics #where_clause {
            /// 按字段声明顺序创建记录（由 `#[immutable]` 生成）
            #[inline]
            #[allow(clippy::too_many_arguments)]
            pub const fn new(#(#names: #types),*) -> Self {
                Self { #(#names),* }
            }

            #(#getters)*
        }
    })
}
