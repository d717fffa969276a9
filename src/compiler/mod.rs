pub mod directive;
pub mod engine;
pub mod host;
pub mod tag_stack;

pub use engine::DelimiterStackEngine;
pub use host::{ActiveTags, DirectiveStep, HostCompiler, ViewCompiler};
pub use tag_stack::{EngineState, TagStack};
