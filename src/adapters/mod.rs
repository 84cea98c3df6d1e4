pub mod blockdev;
pub mod service;

pub use blockdev::*;
pub use service::*;
