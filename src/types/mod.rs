pub mod channel;
pub mod errors;
pub mod event;
pub mod ids;
pub mod report;
pub mod storage;

pub use channel::*;
pub use errors::*;
pub use event::*;
pub use ids::*;
pub use report::*;
pub use storage::*;
