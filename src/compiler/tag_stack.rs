use crate::models::tag_class::{DelimiterPair, TagClass};

/// 某一类标签的历史记录。
///
/// 构造时压入框架默认标签，之后只追加（编译失败时回退本次追加的部分）：
/// 栈底是默认标签，栈顶是最近一次设置的标签。
/// 成功的编译只会让栈增长，栈在编译器实例的整个生命周期内不会收缩。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStack {
    pairs: Vec<DelimiterPair>,
}

impl TagStack {
    pub fn seeded(default: DelimiterPair) -> Self {
        Self {
            pairs: vec![default],
        }
    }

    pub fn push(&mut self, pair: DelimiterPair) {
        self.pairs.push(pair);
    }

    /// 回退到指定长度，栈底始终保留
    pub(crate) fn truncate(&mut self, len: usize) {
        self.pairs.truncate(len.max(1));
    }

    /// 栈底，即默认标签
    pub fn first(&self) -> &DelimiterPair {
        &self.pairs[0]
    }

    /// 栈顶
    pub fn last(&self) -> &DelimiterPair {
        &self.pairs[self.pairs.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn as_slice(&self) -> &[DelimiterPair] {
        &self.pairs
    }
}

/// 单个编译器实例独占的标签状态
#[derive(Debug, Clone)]
pub struct EngineState {
    pub plain: TagStack,
    pub escaped: TagStack,
    pub revert: bool, // 下一次编译前恢复默认标签，使用一次后清除
}

impl EngineState {
    pub fn new(plain: DelimiterPair, escaped: DelimiterPair) -> Self {
        Self {
            plain: TagStack::seeded(plain),
            escaped: TagStack::seeded(escaped),
            revert: false,
        }
    }

    pub fn stack(&self, class: TagClass) -> &TagStack {
        match class {
            TagClass::Plain => &self.plain,
            TagClass::Escaped => &self.escaped,
        }
    }

    pub fn stack_mut(&mut self, class: TagClass) -> &mut TagStack {
        match class {
            TagClass::Plain => &mut self.plain,
            TagClass::Escaped => &mut self.escaped,
        }
    }
}
