pub mod build;
pub mod images;
pub mod merge_menu;
pub mod serve;
pub mod submit;
pub mod validate;
