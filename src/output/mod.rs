pub mod dockerfile;
pub mod manifest;

pub use dockerfile::{render_dockerfile, DOCKERFILE};
pub use manifest::to_yaml_document;
