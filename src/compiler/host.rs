use crate::compiler::directive::parse_call_args;
use crate::error::{Result, TemplateError};
use crate::models::options::CompilerOptions;
use crate::models::tag_class::{DelimiterPair, TagClass};
use tracing::trace;

/// 一个指令编译步骤：输入模板文本与当前生效的标签，输出转换后的文本
pub type DirectiveStep = Box<dyn Fn(&str, &ActiveTags) -> Result<String>>;

/// 当前生效的两类标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTags {
    pub plain: DelimiterPair,
    pub escaped: DelimiterPair,
}

impl ActiveTags {
    pub fn get(&self, class: TagClass) -> &DelimiterPair {
        match class {
            TagClass::Plain => &self.plain,
            TagClass::Escaped => &self.escaped,
        }
    }
}

/// 宿主编译器需要提供给标签引擎的能力
pub trait HostCompiler {
    fn active_pair(&self, class: TagClass) -> &DelimiterPair;

    /// 设置某一类标签，对同一次编译中后续的插值匹配立即生效
    fn set_active_pair(&mut self, class: TagClass, pair: DelimiterPair) -> Result<()>;

    /// 注册指令编译步骤；同名步骤原位替换，否则追加到末尾
    fn register_directive(&mut self, name: &str, step: DirectiveStep);

    /// 按注册顺序执行全部指令编译步骤
    fn compile_directives(&self, source: String) -> Result<String>;
}

/// 默认的宿主编译器，把插值与 include 指令编译成视图层可解析的形式：
/// `##` 字面量 `#`，`#{expr}` 转义输出，`#!{expr}` 原样输出，`#[name]` 引入子视图。
pub struct ViewCompiler {
    tags: ActiveTags,
    steps: Vec<(String, DirectiveStep)>,
}

impl ViewCompiler {
    pub fn new(plain: DelimiterPair, escaped: DelimiterPair) -> Self {
        let mut compiler = Self {
            tags: ActiveTags { plain, escaped },
            steps: Vec::new(),
        };
        // echos 必须先于 includes：前者会转义文本中的 `#`
        compiler.register_directive("echos", Box::new(compile_echos));
        compiler.register_directive("includes", Box::new(compile_includes));
        compiler
    }

    pub fn from_options(options: &CompilerOptions) -> Self {
        Self::new(options.content_tags.clone(), options.escaped_tags.clone())
    }

    pub fn active_tags(&self) -> &ActiveTags {
        &self.tags
    }

    pub fn directive_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl HostCompiler for ViewCompiler {
    fn active_pair(&self, class: TagClass) -> &DelimiterPair {
        self.tags.get(class)
    }

    fn set_active_pair(&mut self, class: TagClass, pair: DelimiterPair) -> Result<()> {
        if pair.open.is_empty() || pair.close.is_empty() {
            return Err(TemplateError::InvalidTags(format!(
                "{} tags must not be empty, got '{}' and '{}'",
                class, pair.open, pair.close
            )));
        }
        match class {
            TagClass::Plain => self.tags.plain = pair,
            TagClass::Escaped => self.tags.escaped = pair,
        }
        Ok(())
    }

    fn register_directive(&mut self, name: &str, step: DirectiveStep) {
        match self.steps.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = step,
            None => self.steps.push((name.to_string(), step)),
        }
    }

    fn compile_directives(&self, source: String) -> Result<String> {
        let mut value = source;
        for (name, step) in &self.steps {
            trace!(directive = %name, "compiling directive");
            value = step(&value, &self.tags)?;
        }
        Ok(value)
    }
}

/// 把插值编译为 `#{expr}` / `#!{expr}`。
///
/// 开标签较长的一类先匹配，这样默认配置下 `{{{ x }}}` 不会被当成 `{{ x }}`。
/// 找不到闭标签的开标签按普通文本处理。表达式中的 `}` 写作 `}}`。
pub fn compile_echos(source: &str, tags: &ActiveTags) -> Result<String> {
    let mut order = [(&tags.escaped, true), (&tags.plain, false)];
    if tags.plain.open.len() > tags.escaped.open.len() {
        order.swap(0, 1);
    }

    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    'scan: while pos < source.len() {
        let remaining = &source[pos..];

        for (pair, escaped) in order {
            if !remaining.starts_with(pair.open.as_str()) {
                continue;
            }
            let body = &remaining[pair.open.len()..];
            if let Some(end) = body.find(pair.close.as_str()) {
                let len = pair.open.len() + end + pair.close.len();
                let expr = body[..end].trim();
                if expr.is_empty() {
                    // 空插值原样保留
                    out.push_str(&remaining[..len].replace('#', "##"));
                } else {
                    out.push_str(if escaped { "#{" } else { "#!{" });
                    out.push_str(&expr.replace('}', "}}"));
                    out.push('}');
                }
                pos += len;
                continue 'scan;
            }
        }

        let ch = remaining.chars().next().unwrap_or_default();
        if ch == '#' {
            out.push_str("##");
        } else {
            out.push(ch);
        }
        pos += ch.len_utf8();
    }
    Ok(out)
}

/// 把 `@include('name')` 编译为 `#[name]`
pub fn compile_includes(source: &str, _tags: &ActiveTags) -> Result<String> {
    const KEYWORD: &str = "@include";

    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    while let Some(idx) = source[pos..].find(KEYWORD) {
        let start = pos + idx;
        let kw_end = start + KEYWORD.len();
        out.push_str(&source[pos..start]);

        match parse_call_args(source, kw_end) {
            Some((end, args)) if args.len() == 1 && !args[0].is_empty() => {
                out.push_str("#[");
                out.push_str(&args[0]);
                out.push(']');
                pos = end;
            }
            _ => {
                out.push_str(KEYWORD);
                pos = kw_end;
            }
        }
    }
    out.push_str(&source[pos..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_tags() -> ActiveTags {
        ActiveTags {
            plain: DelimiterPair::new("{{", "}}"),
            escaped: DelimiterPair::new("{{{", "}}}"),
        }
    }

    #[test]
    fn test_compile_echos_default_tags() {
        let out = compile_echos("Hi {{ name }} and {{{ bio }}}!", &default_tags()).unwrap();
        assert_eq!(out, "Hi #!{name} and #{bio}!");
    }

    #[test]
    fn test_compile_echos_escapes_hash() {
        let out = compile_echos("# {{ a }} #{b}", &default_tags()).unwrap();
        assert_eq!(out, "## #!{a} ##{b}");
    }

    #[test]
    fn test_compile_echos_unclosed_is_text() {
        let out = compile_echos("{{ name", &default_tags()).unwrap();
        assert_eq!(out, "{{ name");
    }

    #[test]
    fn test_compile_echos_empty_expression_is_text() {
        let out = compile_echos("a {{ }} {{{}}} #", &default_tags()).unwrap();
        assert_eq!(out, "a {{ }} {{{}}} ##");
    }

    #[test]
    fn test_compile_echos_doubles_closing_brace() {
        let tags = ActiveTags {
            plain: DelimiterPair::new("<%", "%>"),
            escaped: DelimiterPair::new("{{{", "}}}"),
        };
        let out = compile_echos("x <% '}' %> <% a} %>", &tags).unwrap();
        assert_eq!(out, "x #!{'}}'} #!{a}}}");
    }

    #[test]
    fn test_compile_echos_longer_plain_open_first() {
        let tags = ActiveTags {
            plain: DelimiterPair::new("<%=", "%>"),
            escaped: DelimiterPair::new("<%", "%>"),
        };
        let out = compile_echos("<%= a %> <% b %>", &tags).unwrap();
        assert_eq!(out, "#!{a} #{b}");
    }

    #[test]
    fn test_compile_includes() {
        let out = compile_includes("a @include('partials.nav') b @include c", &default_tags()).unwrap();
        assert_eq!(out, "a #[partials.nav] b @include c");
    }

    #[test]
    fn test_set_active_pair_rejects_empty() {
        let mut compiler = ViewCompiler::new(
            DelimiterPair::new("{{", "}}"),
            DelimiterPair::new("{{{", "}}}"),
        );
        let err = compiler
            .set_active_pair(TagClass::Plain, DelimiterPair::new("", "]]"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTags(_)));
        assert_eq!(compiler.active_pair(TagClass::Plain).open, "{{");
    }

    #[test]
    fn test_pipeline_runs_in_registration_order() {
        let mut compiler = ViewCompiler::new(
            DelimiterPair::new("[[", "]]"),
            DelimiterPair::new("[[[", "]]]"),
        );
        compiler.register_directive(
            "upper",
            Box::new(|source: &str, _: &ActiveTags| Ok(source.to_uppercase())),
        );
        assert_eq!(compiler.directive_names(), vec!["echos", "includes", "upper"]);

        let out = compiler
            .compile_directives("[[ name ]] @include('nav')".to_string())
            .unwrap();
        assert_eq!(out, "#!{NAME} #[NAV]");
    }

    #[test]
    fn test_register_directive_replaces_same_name() {
        let mut compiler = ViewCompiler::from_options(&CompilerOptions::default());
        compiler.register_directive("includes", Box::new(|source: &str, _: &ActiveTags| Ok(source.to_string())));
        assert_eq!(compiler.directive_names(), vec!["echos", "includes"]);

        let out = compiler
            .compile_directives("@include('nav')".to_string())
            .unwrap();
        assert_eq!(out, "@include('nav')");
    }
}
