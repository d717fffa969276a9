use proc_macro::TokenStream;

mod assets;

/// 编译期内嵌匹配 glob 模式的视图文件，并在程序启动时注册到视图仓库。
///
/// ```ignore
/// tagstack::view_assets!("resources/views/**/*.html");
/// ```
#[proc_macro]
pub fn view_assets(input: TokenStream) -> TokenStream {
    assets::view_assets_impl(input)
}
