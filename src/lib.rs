pub mod compiler;
pub mod error;
pub mod models;
pub mod value;
pub(crate) mod view;
pub mod view_factory;
pub mod view_loader;

#[doc(hidden)]
pub use ctor;
pub use tagstack_macros::view_assets;
