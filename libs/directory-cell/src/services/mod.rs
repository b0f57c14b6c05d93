pub mod registry;

pub use registry::{DirectoryService, ResourceDirectory};
