use glob::glob;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::hash_map::DefaultHasher;
use std::env;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use syn::{LitStr, parse_macro_input};

pub fn view_assets_impl(input: TokenStream) -> TokenStream {
    let pattern = parse_macro_input!(input as LitStr);
    let pattern_str = pattern.value();

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return syn::Error::new(pattern.span(), "未设置 CARGO_MANIFEST_DIR 环境变量")
            .to_compile_error()
            .into();
    };
    let root = PathBuf::from(manifest_dir);
    let full_pattern = root.join(&pattern_str);
    // 视图名相对于模式中第一个通配符之前的目录计算
    let base = root.join(literal_base(&pattern_str));

    let files: Vec<PathBuf> = match glob(&full_pattern.to_string_lossy()) {
        Ok(paths) => paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect(),
        Err(e) => {
            return syn::Error::new(pattern.span(), format!("无效的 glob 模式: {}", e))
                .to_compile_error()
                .into();
        }
    };

    let assets: Vec<_> = files
        .iter()
        .map(|path| {
            let abs = path.to_string_lossy().to_string();
            let rel = relative_path(path, &base);
            quote! {
                (#rel, include_str!(#abs))
            }
        })
        .collect();

    // 同一 crate 内多次调用时避免函数重名
    let mut hasher = DefaultHasher::new();
    pattern_str.hash(&mut hasher);
    let fn_name = format_ident!("__tagstack_register_views_{}", hasher.finish());

    let output = quote! {
        #[::tagstack::ctor::ctor]
        fn #fn_name() {
            let assets = vec![
                #(#assets),*
            ];
            if let Err(e) = ::tagstack::view_loader::load_assets(assets) {
                eprintln!("tagstack: {:#}", e);
            }
        }
    };

    output.into()
}

fn literal_base(pattern: &str) -> &str {
    let end = pattern.find(['*', '?', '[']).unwrap_or(pattern.len());
    match pattern[..end].rfind('/') {
        Some(idx) => &pattern[..idx],
        None => "",
    }
}

fn relative_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
