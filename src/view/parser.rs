use crate::view::ViewNode;

/// 解析编译后的视图文本。
///
/// `##` 为字面量 `#`，`#{expr}` / `#!{expr}` 为输出，`#[name]` 为子视图；
/// 其余不完整的标记按普通文本保留。
pub fn parse_compiled(compiled: &str) -> Vec<ViewNode> {
    let mut nodes = Vec::new();
    let mut pos = 0;
    let len = compiled.len();

    while pos < len {
        let remaining = &compiled[pos..];

        // 1. ## -> #
        if remaining.starts_with("##") {
            append_text(&mut nodes, "#");
            pos += 2;
            continue;
        }

        // 2. #{expr} / #!{expr}
        let echo = if remaining.starts_with("#{") {
            Some((2, true))
        } else if remaining.starts_with("#!{") {
            Some((3, false))
        } else {
            None
        };
        if let Some((skip, escaped)) = echo {
            if let Some((expr, used)) = scan_expr(&remaining[skip..]) {
                let expr = expr.trim();
                if !expr.is_empty() {
                    nodes.push(ViewNode::Echo {
                        expr: expr.to_string(),
                        escaped,
                    });
                    pos += skip + used;
                    continue;
                }
            }
        }

        // 3. #[name]
        if remaining.starts_with("#[") {
            if let Some(end) = remaining[2..].find(']') {
                let name = remaining[2..2 + end].trim();
                if !name.is_empty() {
                    nodes.push(ViewNode::Include {
                        name: name.to_string(),
                    });
                    pos += 2 + end + 1;
                    continue;
                }
            }
        }

        // 4. Text
        let first = remaining.chars().next().map_or(1, char::len_utf8);
        let next_stop = remaining[first..]
            .find('#')
            .map_or(remaining.len(), |i| i + first);
        append_text(&mut nodes, &remaining[..next_stop]);
        pos += next_stop;
    }

    nodes
}

/// 读取到单个 `}` 为止，`}}` 还原为 `}`。返回表达式与消耗的字节数（含结尾的 `}`）
fn scan_expr(body: &str) -> Option<(String, usize)> {
    let mut expr = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch != '}' {
            expr.push(ch);
            continue;
        }
        if chars.next_if(|&(_, c)| c == '}').is_some() {
            expr.push('}');
        } else {
            return Some((expr, i + 1));
        }
    }
    None
}

fn append_text(nodes: &mut Vec<ViewNode>, text: &str) {
    if let Some(ViewNode::Text(last_text)) = nodes.last_mut() {
        last_text.push_str(text);
    } else {
        nodes.push(ViewNode::Text(text.to_string()));
    }
}
