pub mod clock;
pub mod http;
pub mod store;
pub mod wire;

pub use clock::{ManualClock, SystemClock};
pub use http::HttpGateway;
pub use store::{FileStore, MemoryStore};
