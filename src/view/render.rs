use crate::error::Result;
use crate::view::ViewNode;
use crate::view::render_context::Context;

/// 渲染视图节点，子视图交给 `include` 回调写入同一个输出
pub(crate) fn render(
    nodes: &[ViewNode],
    ctx: &Context,
    out: &mut String,
    include: &mut dyn FnMut(&str, &mut String) -> Result<()>,
) -> Result<()> {
    for node in nodes {
        match node {
            ViewNode::Text(t) => out.push_str(t),
            ViewNode::Echo { expr, escaped } => {
                let text = ctx.lookup(expr).to_string();
                if *escaped {
                    escape_html(&text, out);
                } else {
                    out.push_str(&text);
                }
            }
            ViewNode::Include { name } => include(name, out)?,
        }
    }
    Ok(())
}

pub(crate) fn escape_html(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
