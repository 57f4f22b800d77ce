pub mod color;
pub mod kind;
pub mod param;
pub mod registry;

pub use color::*;
pub use kind::*;
pub use param::*;
pub use registry::*;
