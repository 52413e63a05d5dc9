pub mod countdown;
pub mod registry;
pub mod session;

pub use registry::ReviewSessions;
pub use session::{Gate, ReviewContext, ReviewSession, SessionPhase, SessionSnapshot};
