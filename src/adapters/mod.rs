//! Adapters layer: Concrete implementations of ports.
//!
//! - `gbtree`: gradient-boosted tree ensemble exported by the training
//!   pipeline, implementing the classifier port

pub mod gbtree;

pub use gbtree::{GbTreeModel, ModelLoadError};
