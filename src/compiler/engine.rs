use crate::compiler::directive::{match_directive, strip_directive};
use crate::compiler::host::HostCompiler;
use crate::compiler::tag_stack::{EngineState, TagStack};
use crate::error::{Result, TemplateError};
use crate::models::options::DirectiveOptions;
use crate::models::tag_class::{DelimiterPair, TagClass};
use tracing::{debug, warn};

/// 内容标签栈引擎。
///
/// 包装一个宿主编译器：每次编译先处理切换普通标签与转义标签的指令，
/// 再交给宿主按注册顺序执行其余指令编译步骤。每个实例独占自己的 [`EngineState`]。
pub struct DelimiterStackEngine<H: HostCompiler> {
    host: H,
    state: EngineState,
    directives: DirectiveOptions,
}

impl<H: HostCompiler> DelimiterStackEngine<H> {
    /// 以宿主当前生效的标签作为两类标签栈的栈底
    pub fn new(host: H, directives: DirectiveOptions) -> Self {
        let state = EngineState::new(
            host.active_pair(TagClass::Plain).clone(),
            host.active_pair(TagClass::Escaped).clone(),
        );
        Self {
            host,
            state,
            directives,
        }
    }

    /// 编译模板入口。
    ///
    /// 一次编译要么完整生效，要么不留下任何标签变化：任一步骤失败时，
    /// 本次压入的标签出栈，宿主标签恢复为编译前的状态。已消费的恢复请求不回滚。
    pub fn compile_template(&mut self, source: &str) -> Result<String> {
        self.apply_pending_revert()?;

        let checkpoint = self.checkpoint();
        let result = self.compile_pass(source);
        if result.is_err() {
            self.rollback(checkpoint);
        }
        result
    }

    fn compile_pass(&mut self, source: &str) -> Result<String> {
        let value = self.filter_plain(source.to_string())?;
        let value = self.filter_escaped(value)?;
        self.host.compile_directives(value)
    }

    /// 若已请求恢复默认标签，则把栈底的默认标签重新设置给宿主并压栈，然后清除请求
    pub fn apply_pending_revert(&mut self) -> Result<()> {
        if std::mem::take(&mut self.state.revert) {
            let plain = self.state.plain.first().clone();
            let escaped = self.state.escaped.first().clone();
            self.push_pair(TagClass::Plain, plain)?;
            self.push_pair(TagClass::Escaped, escaped)?;
            debug!("content tags reverted to defaults");
        }
        Ok(())
    }

    /// 设置宿主标签并压栈，与指令生效的路径相同；宿主拒绝时不压栈
    pub fn push_pair(&mut self, class: TagClass, pair: DelimiterPair) -> Result<()> {
        push_active(&mut self.state, &mut self.host, class, pair)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            plain: self.host.active_pair(TagClass::Plain).clone(),
            escaped: self.host.active_pair(TagClass::Escaped).clone(),
            plain_len: self.state.plain.len(),
            escaped_len: self.state.escaped.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.state.plain.truncate(checkpoint.plain_len);
        self.state.escaped.truncate(checkpoint.escaped_len);
        for (class, pair) in [
            (TagClass::Plain, checkpoint.plain),
            (TagClass::Escaped, checkpoint.escaped),
        ] {
            if let Err(e) = self.host.set_active_pair(class, pair) {
                warn!(class = %class, error = %e, "failed to restore content tags");
            }
        }
    }

    /// 处理切换普通内容标签的指令
    pub fn filter_plain(&mut self, source: String) -> Result<String> {
        filter(
            &mut self.state,
            &mut self.host,
            &self.directives.content_keyword,
            TagClass::Plain,
            source,
        )
    }

    /// 处理切换转义标签的指令
    pub fn filter_escaped(&mut self, source: String) -> Result<String> {
        filter(
            &mut self.state,
            &mut self.host,
            &self.directives.escaped_keyword,
            TagClass::Escaped,
            source,
        )
    }

    pub fn default_plain_pair(&self) -> &DelimiterPair {
        self.state.plain.first()
    }

    pub fn default_escaped_pair(&self) -> &DelimiterPair {
        self.state.escaped.first()
    }

    /// 栈顶标签，始终与宿主当前生效的标签一致
    pub fn parent_plain_pair(&self) -> &DelimiterPair {
        self.state.plain.last()
    }

    pub fn parent_escaped_pair(&self) -> &DelimiterPair {
        self.state.escaped.last()
    }

    /// 请求在下一次编译前恢复默认标签，只生效一次
    pub fn request_revert_to_defaults(&mut self, revert: bool) {
        self.state.revert = revert;
    }

    pub fn tag_stack(&self, class: TagClass) -> &TagStack {
        self.state.stack(class)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

fn filter<H: HostCompiler>(
    state: &mut EngineState,
    host: &mut H,
    keyword: &str,
    class: TagClass,
    source: String,
) -> Result<String> {
    let Some(found) = match_directive(keyword, &source) else {
        return Ok(source);
    };
    let value = strip_directive(&source, &found);
    apply_tags(state, host, class, &found.args)?;
    Ok(value)
}

/// 编译前的标签状态，编译失败时据此回滚
struct Checkpoint {
    plain: DelimiterPair,
    escaped: DelimiterPair,
    plain_len: usize,
    escaped_len: usize,
}

/// 解析指令参数并应用到宿主
fn apply_tags<H: HostCompiler>(
    state: &mut EngineState,
    host: &mut H,
    class: TagClass,
    args: &[String],
) -> Result<()> {
    let (open, close, target) = match args {
        [open, close] => (open, close, class),
        [open, close, flag] => {
            let target = if parse_escaped_flag(flag)? {
                TagClass::Escaped
            } else {
                class
            };
            (open, close, target)
        }
        _ => {
            return Err(TemplateError::InvalidTags(format!(
                "expected 2 or 3 arguments, got {}",
                args.len()
            )));
        }
    };

    let pair = DelimiterPair::new(open.as_str(), close.as_str());
    debug!(class = %target, tags = %pair, "content tags changed");
    push_active(state, host, target, pair)
}

fn push_active<H: HostCompiler>(
    state: &mut EngineState,
    host: &mut H,
    class: TagClass,
    pair: DelimiterPair,
) -> Result<()> {
    host.set_active_pair(class, pair.clone())?;
    state.stack_mut(class).push(pair);
    Ok(())
}

fn parse_escaped_flag(flag: &str) -> Result<bool> {
    match flag.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(TemplateError::InvalidTags(format!(
            "escaped flag must be a boolean, got '{}'",
            other
        ))),
    }
}
