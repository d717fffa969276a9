use crate::models::tag_class::DelimiterPair;

pub const DEFAULT_CONTENT_KEYWORD: &str = "changecontenttags";
pub const DEFAULT_ESCAPED_KEYWORD: &str = "changeescapedtags";

/// 指令关键字配置
#[derive(Debug, Clone)]
pub struct DirectiveOptions {
    pub content_keyword: String, // 切换普通内容标签的指令名
    pub escaped_keyword: String, // 切换转义标签的指令名
}

impl Default for DirectiveOptions {
    fn default() -> Self {
        DirectiveOptions {
            content_keyword: DEFAULT_CONTENT_KEYWORD.to_string(),
            escaped_keyword: DEFAULT_ESCAPED_KEYWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub directives: DirectiveOptions,
    pub content_tags: DelimiterPair, // 框架内置的普通内容标签
    pub escaped_tags: DelimiterPair, // 框架内置的转义标签
    pub revert_per_view: bool,       // 每个顶层视图编译前恢复默认标签
    pub cache_enabled: bool,         // 缓存编译后的视图
    pub max_include_depth: usize,    // include 最大嵌套深度
    pub view_extension: String,      // 视图文件扩展名
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        CompilerOptions {
            directives: DirectiveOptions::default(),
            content_tags: DelimiterPair::new("{{", "}}"),
            escaped_tags: DelimiterPair::new("{{{", "}}}"),
            revert_per_view: true,
            cache_enabled: true,
            max_include_depth: 32,
            view_extension: "html".to_string(),
        }
    }

    pub fn content_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.directives.content_keyword = keyword.into();
        self
    }

    pub fn escaped_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.directives.escaped_keyword = keyword.into();
        self
    }

    pub fn content_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.content_tags = DelimiterPair::new(open, close);
        self
    }

    pub fn escaped_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.escaped_tags = DelimiterPair::new(open, close);
        self
    }

    pub fn revert_per_view(mut self, revert: bool) -> Self {
        self.revert_per_view = revert;
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn view_extension(mut self, extension: impl Into<String>) -> Self {
        self.view_extension = extension.into();
        self
    }
}
