use crate::value::Value;

static NULL: Value = Value::Null;

pub struct Context<'a> {
    root: &'a Value,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    pub fn lookup(&self, key: &str) -> &'a Value {
        // 1. 尝试直接匹配根对象的属性
        if let Some(v) = self.get_from_root(key) {
            return v;
        }

        // 2. 尝试嵌套查找（例如 "user.name"、"items.0"）
        if let Some((head, rest)) = key.split_once('.') {
            if let Some(head_value) = self.get_from_root(head) {
                if let Some(target) = Self::resolve_path(head_value, rest) {
                    return target;
                }
            }
        }

        &NULL
    }

    fn get_from_root(&self, key: &str) -> Option<&'a Value> {
        match self.root {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// 辅助函数：在 Value 中根据点号分隔的路径查找值
    fn resolve_path(mut current: &'a Value, path: &str) -> Option<&'a Value> {
        for part in path.split('.') {
            current = match current {
                Value::Map(m) => m.get(part)?,
                Value::List(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_lookup_simple() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::I64(1));
        let root = Value::Map(map);
        let ctx = Context::new(&root);

        assert_eq!(ctx.lookup("a"), &Value::I64(1));
        assert_eq!(ctx.lookup("b"), &Value::Null);
    }

    #[test]
    fn test_lookup_nested() {
        let mut sub = BTreeMap::new();
        sub.insert("b".to_string(), Value::I64(2));

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Value::Map(sub));
        map.insert(
            "list".to_string(),
            Value::List(vec![Value::from("x"), Value::from("y")]),
        );
        let root = Value::Map(map);
        let ctx = Context::new(&root);

        assert_eq!(ctx.lookup("a.b"), &Value::I64(2));
        assert_eq!(ctx.lookup("a.c"), &Value::Null);
        assert_eq!(ctx.lookup("x.y"), &Value::Null);
        assert_eq!(ctx.lookup("list.1"), &Value::from("y"));
        assert_eq!(ctx.lookup("list.9"), &Value::Null);
    }

    #[test]
    fn test_lookup_exact_match_with_dot() {
        let mut map = BTreeMap::new();
        map.insert("a.b".to_string(), Value::I64(3));
        let root = Value::Map(map);
        let ctx = Context::new(&root);

        assert_eq!(ctx.lookup("a.b"), &Value::I64(3));
    }

    #[test]
    fn test_lookup_on_scalar_root() {
        let root = Value::from("plain");
        let ctx = Context::new(&root);
        assert_eq!(ctx.lookup("anything"), &Value::Null);
    }
}
