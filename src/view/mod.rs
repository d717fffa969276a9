pub(crate) mod cache;
pub(crate) mod parser;
pub(crate) mod render;
pub(crate) mod render_context;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Text(String),
    Echo { expr: String, escaped: bool },
    Include { name: String },
}
