//! Loaders for ensembles trained in external frameworks.

pub mod xgboost;

pub use xgboost::{addtree_from_xgb_dump, XgbImportConfig};
