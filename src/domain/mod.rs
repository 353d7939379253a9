//! Interval algebra over single features and the hyper-rectangles they form.

mod domains;
mod real_domain;

pub use domains::Domains;
pub use real_domain::{FloatT, RealDomain, WhereFlag};
