pub mod patch;
pub mod projects;

pub use patch::{parse_patch, LabelPatchEngine, PatchOperation};
pub use projects::{CreateProject, ProjectLifecycle};
