//! Tools exposed to crew agents.

pub mod catalog;
pub mod dispatch;
pub mod hiro;

pub use catalog::{ToolCatalog, ToolKind, ToolSpec};
pub use dispatch::Toolbox;
pub use hiro::HiroClient;
