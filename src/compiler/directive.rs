/// 模板中匹配到的一条标签指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch {
    /// 被匹配的完整文本（含指令前的空白）
    pub text: String,
    /// 去掉引号与空白后的参数
    pub args: Vec<String>,
}

/// 在 `source` 中查找第一条形如 `keyword('<<', '>>')` 的指令。
///
/// 关键字前不能紧跟单词字符；关键字与 `(` 之间允许空白；参数必须是单/双引号字面量
/// 或裸标识符（例如 `true`），并且整条指令位于同一行。不合法的写法不算匹配，
/// 继续向后查找。
pub fn match_directive(keyword: &str, source: &str) -> Option<DirectiveMatch> {
    if keyword.is_empty() {
        return None;
    }

    let mut from = 0;
    while let Some(idx) = source[from..].find(keyword) {
        let kw_start = from + idx;
        let kw_end = kw_start + keyword.len();

        if let Some(start) = match_start(source, kw_start) {
            if let Some((end, args)) = parse_call_args(source, kw_end) {
                return Some(DirectiveMatch {
                    text: source[start..end].to_string(),
                    args,
                });
            }
        }

        from = kw_start + source[kw_start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// 只移除第一次出现的指令文本，其余相同的文本原样保留
pub fn strip_directive(source: &str, found: &DirectiveMatch) -> String {
    source.replacen(&found.text, "", 1)
}

/// 计算匹配的起点：关键字前的空白属于匹配的一部分，
/// 但空白之前若是单词字符，则第一个空白字符不计入。
fn match_start(source: &str, kw_start: usize) -> Option<usize> {
    let before = &source[..kw_start];
    let trimmed = before.trim_end_matches(|c: char| c.is_ascii_whitespace());
    let ws_start = trimmed.len();

    if !trimmed.chars().next_back().is_some_and(is_word_char) {
        return Some(ws_start);
    }
    if ws_start < kw_start {
        return Some(ws_start + 1);
    }
    None
}

/// 解析 `( arg, arg, ... )`，返回右括号之后的位置与参数列表
pub(crate) fn parse_call_args(source: &str, pos: usize) -> Option<(usize, Vec<String>)> {
    let bytes = source.as_bytes();
    let mut i = skip_while(bytes, pos, |b| b.is_ascii_whitespace());
    if bytes.get(i) != Some(&b'(') {
        return None;
    }
    i += 1;

    let mut args = Vec::new();
    loop {
        i = skip_while(bytes, i, is_inline_space);
        match *bytes.get(i)? {
            quote @ (b'\'' | b'"') => {
                let body = &source[i + 1..];
                let end = body.find(quote as char)?;
                let literal = &body[..end];
                if literal.contains('\n') {
                    return None;
                }
                args.push(literal.trim().to_string());
                i += 1 + end + 1;
            }
            b if is_word_byte(b) => {
                let end = skip_while(bytes, i, is_word_byte);
                args.push(source[i..end].to_string());
                i = end;
            }
            _ => return None,
        }

        i = skip_while(bytes, i, is_inline_space);
        match *bytes.get(i)? {
            b',' => i += 1,
            b')' => return Some((i + 1, args)),
            _ => return None,
        }
    }
}

fn skip_while(bytes: &[u8], mut i: usize, pred: impl Fn(u8) -> bool) -> usize {
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

fn is_inline_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    const KW: &str = "changecontenttags";

    #[test]
    fn test_match_single_quotes() {
        let found = match_directive(KW, "changecontenttags('<%','%>') Hello <%name%>").unwrap();
        assert_eq!(found.text, "changecontenttags('<%','%>')");
        assert_eq!(found.args, vec!["<%", "%>"]);
    }

    #[test]
    fn test_match_double_quotes_and_flag() {
        let found = match_directive(KW, "changecontenttags(\"[[\" , \"]]\", true)").unwrap();
        assert_eq!(found.args, vec!["[[", "]]", "true"]);
    }

    #[test]
    fn test_arguments_are_trimmed() {
        let found = match_directive(KW, "changecontenttags(' <% ', '  %>')").unwrap();
        assert_eq!(found.args, vec!["<%", "%>"]);
    }

    #[test]
    fn test_comma_inside_quotes() {
        let found = match_directive(KW, "changecontenttags(',<', '>,')").unwrap();
        assert_eq!(found.args, vec![",<", ">,"]);
    }

    #[test]
    fn test_leading_whitespace_is_consumed() {
        let source = "<p>\n  changecontenttags('<%','%>')\n</p>";
        let found = match_directive(KW, source).unwrap();
        assert_eq!(found.text, "\n  changecontenttags('<%','%>')");
        assert_eq!(strip_directive(source, &found), "<p>\n</p>");
    }

    #[test]
    fn test_whitespace_after_word_keeps_one_char() {
        let source = "hello  changecontenttags('<%','%>')";
        let found = match_directive(KW, source).unwrap();
        assert_eq!(found.text, " changecontenttags('<%','%>')");
        assert_eq!(strip_directive(source, &found), "hello ");
    }

    #[test]
    fn test_keyword_inside_word_is_ignored() {
        assert!(match_directive(KW, "xchangecontenttags('<%','%>')").is_none());
    }

    #[test]
    fn test_malformed_is_no_match() {
        assert!(match_directive(KW, "changecontenttags").is_none());
        assert!(match_directive(KW, "changecontenttags()").is_none());
        assert!(match_directive(KW, "changecontenttags('<%','%>'").is_none());
        assert!(match_directive(KW, "changecontenttags('<%' '%>')").is_none());
        assert!(match_directive(KW, "changecontenttags('<%\n','%>')").is_none());
    }

    #[test]
    fn test_skips_malformed_occurrence() {
        let source = "changecontenttags( oops changecontenttags('<%','%>')";
        let found = match_directive(KW, source).unwrap();
        assert_eq!(found.args, vec!["<%", "%>"]);
    }

    #[test]
    fn test_only_first_occurrence_removed() {
        let source = "a changecontenttags('<%','%>') b changecontenttags('<%','%>') c";
        let found = match_directive(KW, source).unwrap();
        assert_eq!(
            strip_directive(source, &found),
            "a  b changecontenttags('<%','%>') c"
        );
    }

    #[test]
    fn test_argument_count_is_not_checked_here() {
        let found = match_directive(KW, "changecontenttags('<%')").unwrap();
        assert_eq!(found.args.len(), 1);
    }
}
