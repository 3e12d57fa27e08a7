//! Task stores
//!
//! Two variants share one operation contract: [`RemoteTaskStore`] mirrors a
//! remote collaborator into local state, [`LocalTaskStore`] keeps everything
//! in local persisted state. The variant is picked at construction time.

mod local;
mod mirror;
mod ops;
mod remote;

pub use local::LocalTaskStore;
pub use mirror::{TaskMirror, STORAGE_NAME};
pub use ops::TaskOps;
pub use remote::RemoteTaskStore;
