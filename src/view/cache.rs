use crate::compiler::ActiveTags;
use crate::models::tag_class::{DelimiterPair, TagClass};
use crate::view::ViewNode;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Clone)]
pub struct CachedView {
    pub nodes: Arc<Vec<ViewNode>>,
    pub content_hash: u64,
    /// 编译期间指令压入的标签，按压栈顺序记录；命中缓存时重放
    pub pushed: Vec<(TagClass, DelimiterPair)>,
}

/// 按视图名缓存解析后的视图。
///
/// 同一份源码在不同的起始标签下会编译出不同结果，因此哈希同时覆盖源码与起始标签。
#[derive(Default)]
pub struct ViewCache {
    entries: DashMap<String, CachedView>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fingerprint(source: &str, tags_before: &ActiveTags) -> u64 {
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        tags_before.plain.hash(&mut hasher);
        tags_before.escaped.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, name: &str, content_hash: u64) -> Option<CachedView> {
        let cached = self.entries.get(name)?;
        if cached.content_hash == content_hash {
            return Some(cached.value().clone());
        }
        None
    }

    pub fn insert(&self, name: &str, view: CachedView) {
        self.entries.insert(name.to_string(), view);
    }

    pub fn remove(&self, name: &str) {
        self.entries.remove(name);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
