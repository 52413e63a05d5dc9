pub mod categories;
pub mod invalidation;
pub mod notes;
pub mod state;
pub mod tasks;

pub use categories::CategoriesCache;
pub use invalidation::{Invalidation, InvalidationBus, InvalidationSubscriber};
pub use notes::{NotesCache, NotesData};
pub use state::CacheState;
pub use tasks::TasksCache;
