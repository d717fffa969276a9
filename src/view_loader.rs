use anyhow::{Context, Result};
use dashmap::DashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use walkdir::WalkDir;

pub type ViewStore = DashMap<String, Arc<str>>;

static VIEWS: OnceLock<ViewStore> = OnceLock::new();

fn store() -> &'static ViewStore {
    VIEWS.get_or_init(DashMap::new)
}

/// 注册内嵌的视图资源，元素为 (相对路径, 内容)
pub fn load_assets(assets: Vec<(&str, &str)>) -> Result<()> {
    for (path, content) in assets {
        register_view(&view_name(path), content)
            .with_context(|| format!("加载视图资源失败: {}", path))?;
    }
    Ok(())
}

/// 递归读取指定目录及其子目录下所有以 `extension` 结尾的视图文件
pub fn load_from_path(dir_path: &Path, extension: &str) -> Result<()> {
    let suffix = format!(".{}", extension.trim_start_matches('.'));

    for entry in WalkDir::new(dir_path).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_view = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));

        if path.is_file() && is_view {
            let relative = path.strip_prefix(dir_path).unwrap_or(path);
            let content = fs::read_to_string(path)
                .with_context(|| format!("读取文件失败: {}", path.display()))?;
            let name = view_name(&relative.to_string_lossy());
            register_view(&name, &content)
                .with_context(|| format!("加载视图失败: {}", path.display()))?;
        }
    }
    Ok(())
}

/// 注册单个视图。同名视图已存在且内容不同时报错
pub fn register_view(name: &str, content: &str) -> Result<()> {
    let store = store();
    if let Some(existing) = store.get(name) {
        if existing.value().as_ref() == content {
            return Ok(());
        }
        anyhow::bail!("发现重复的视图名: '{}'", name);
    }
    store.insert(name.to_string(), Arc::from(content));
    debug!(view = name, "view registered");
    Ok(())
}

pub fn find_view(name: &str) -> Option<Arc<str>> {
    VIEWS.get()?.get(name).map(|v| v.value().clone())
}

pub fn remove_view(name: &str) {
    if let Some(store) = VIEWS.get() {
        store.remove(name);
    }
}

/// 相对路径转点号视图名：`admin/users.blade.html` -> `admin.users`
pub fn view_name(relative: &str) -> String {
    let normalized = relative.replace('\\', "/");
    let mut parts: Vec<&str> = normalized
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if let Some(file) = parts.pop() {
        let stem = file.split('.').next().unwrap_or(file);
        parts.push(stem);
    }
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_name() {
        assert_eq!(view_name("welcome.html"), "welcome");
        assert_eq!(view_name("admin/users.blade.html"), "admin.users");
        assert_eq!(view_name("./layouts\\app.html"), "layouts.app");
    }

    #[test]
    fn test_register_and_find() {
        register_view("loader_test.page", "<p>{{ a }}</p>").unwrap();
        assert_eq!(
            find_view("loader_test.page").as_deref(),
            Some("<p>{{ a }}</p>")
        );

        // 相同内容重复注册是幂等的
        register_view("loader_test.page", "<p>{{ a }}</p>").unwrap();
        assert!(register_view("loader_test.page", "other").is_err());

        remove_view("loader_test.page");
        assert!(find_view("loader_test.page").is_none());
    }

    #[test]
    fn test_load_assets() {
        load_assets(vec![("loader_assets/nav.html", "<nav></nav>")]).unwrap();
        assert_eq!(find_view("loader_assets.nav").as_deref(), Some("<nav></nav>"));
    }
}
