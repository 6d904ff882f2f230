//! Task store: owns the task collection, the filter and the edit session,
//! and writes a full snapshot through [`PersistenceAdapter`] after every
//! change to the collection.

pub mod persistence;
pub mod store;
pub mod view;

pub use persistence::{PersistError, PersistenceAdapter, DEFAULT_SLOT};
pub use store::{SubscriptionId, TaskStore};
pub use view::{Change, EditSession, ViewModel};
