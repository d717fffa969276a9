use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::compiler::{DelimiterStackEngine, ViewCompiler};
use crate::error::{Result, TemplateError};
use crate::models::options::CompilerOptions;
use crate::models::tag_class::{DelimiterPair, TagClass};
use crate::value::{Value, to_value};
use crate::view::ViewNode;
use crate::view::cache::{CachedView, ViewCache};
use crate::view::parser::parse_compiled;
use crate::view::render;
use crate::view::render_context::Context;
use crate::view_loader;

/// 视图工厂：把标签引擎接入视图的编译与渲染流程。
///
/// 每个工厂独占一个编译器实例及其标签栈，顶层视图在编译前按配置恢复默认标签，
/// 子视图（`@include`）沿用调用方当前的标签继续编译。
pub struct ViewFactory {
    engine: DelimiterStackEngine<ViewCompiler>,
    options: CompilerOptions,
    cache: ViewCache,
}

impl ViewFactory {
    pub fn new(options: CompilerOptions) -> Self {
        let host = ViewCompiler::from_options(&options);
        let engine = DelimiterStackEngine::new(host, options.directives.clone());
        Self {
            engine,
            options,
            cache: ViewCache::new(),
        }
    }

    /// 从目录加载视图文件
    pub fn assets_path(&self, dir_path: impl AsRef<Path>) -> Result<()> {
        view_loader::load_from_path(dir_path.as_ref(), &self.options.view_extension)?;
        Ok(())
    }

    /// 只编译，不渲染
    pub fn compile(&mut self, source: &str) -> Result<String> {
        self.engine.compile_template(source)
    }

    /// 渲染已注册的视图
    pub fn render<T: Serialize + ?Sized>(&mut self, name: &str, params: &T) -> Result<String> {
        let source = view_loader::find_view(name)
            .ok_or_else(|| TemplateError::ViewNotFound(name.to_string()))?;
        self.render_source(name, &source, params)
    }

    /// 以 `name` 为缓存键渲染一段视图源码
    pub fn render_source<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        source: &str,
        params: &T,
    ) -> Result<String> {
        let root = to_value(params)?;

        if self.options.revert_per_view {
            self.engine.request_revert_to_defaults(true);
        }
        let nodes = self.compile_view(name, source)?;

        let mut out = String::with_capacity(source.len());
        self.render_nodes(&nodes, &root, 0, &mut out)?;
        debug!(view = name, "view rendered");
        Ok(out)
    }

    /// 移除某个视图的编译缓存
    pub fn forget(&self, name: &str) {
        self.cache.remove(name);
    }

    pub fn flush(&self) {
        self.cache.clear();
    }

    pub fn engine(&self) -> &DelimiterStackEngine<ViewCompiler> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DelimiterStackEngine<ViewCompiler> {
        &mut self.engine
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn compile_view(&mut self, name: &str, source: &str) -> Result<Arc<Vec<ViewNode>>> {
        self.engine.apply_pending_revert()?;

        if !self.options.cache_enabled {
            let compiled = self.engine.compile_template(source)?;
            return Ok(Arc::new(parse_compiled(&compiled)));
        }

        let hash = ViewCache::fingerprint(source, self.engine.host().active_tags());
        if let Some(cached) = self.cache.get(name, hash) {
            trace!(view = name, "view cache hit");
            self.replay_tags(&cached.pushed)?;
            return Ok(cached.nodes);
        }

        let plain_len = self.engine.tag_stack(TagClass::Plain).len();
        let escaped_len = self.engine.tag_stack(TagClass::Escaped).len();
        let compiled = self.engine.compile_template(source)?;
        let nodes = Arc::new(parse_compiled(&compiled));

        let mut pushed = Vec::new();
        for (class, len) in [(TagClass::Plain, plain_len), (TagClass::Escaped, escaped_len)] {
            let stack = self.engine.tag_stack(class).as_slice();
            pushed.extend(stack[len..].iter().map(|pair| (class, pair.clone())));
        }
        self.cache.insert(
            name,
            CachedView {
                nodes: nodes.clone(),
                content_hash: hash,
                pushed,
            },
        );
        debug!(view = name, "view compiled");
        Ok(nodes)
    }

    /// 命中缓存时跳过了指令处理，按原顺序重放那次编译压入的标签
    fn replay_tags(&mut self, pushed: &[(TagClass, DelimiterPair)]) -> Result<()> {
        for (class, pair) in pushed {
            self.engine.push_pair(*class, pair.clone())?;
        }
        Ok(())
    }

    fn render_nodes(
        &mut self,
        nodes: &[ViewNode],
        root: &Value,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        let ctx = Context::new(root);
        render::render(nodes, &ctx, out, &mut |name, out| {
            self.render_include(name, root, depth + 1, out)
        })
    }

    fn render_include(
        &mut self,
        name: &str,
        root: &Value,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        if depth > self.options.max_include_depth {
            return Err(TemplateError::Render(format!(
                "include depth exceeded {} while including '{}'",
                self.options.max_include_depth, name
            )));
        }
        let source = view_loader::find_view(name)
            .ok_or_else(|| TemplateError::ViewNotFound(name.to_string()))?;

        trace!(view = name, depth, "rendering include");
        let nodes = self.compile_view(name, &source)?;
        self.render_nodes(&nodes, root, depth, out)
    }
}
