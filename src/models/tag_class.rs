use std::fmt;

/// 插值标签类别：普通内容标签与 HTML 转义标签，各自拥有独立的标签栈
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Plain,
    Escaped,
}

impl TagClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagClass::Plain => "content",
            TagClass::Escaped => "escaped",
        }
    }
}

impl fmt::Display for TagClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一对开闭分隔符，例如 `{{` / `}}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelimiterPair {
    pub open: String,
    pub close: String,
}

impl DelimiterPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl fmt::Display for DelimiterPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.open, self.close)
    }
}

impl<A: Into<String>, B: Into<String>> From<(A, B)> for DelimiterPair {
    fn from((open, close): (A, B)) -> Self {
        DelimiterPair::new(open, close)
    }
}
