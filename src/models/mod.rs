pub mod options;
pub mod tag_class;
