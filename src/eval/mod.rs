pub mod scene;
pub mod timeline;
