pub mod entities;
pub mod operation;
pub mod storage_ext;
pub mod stores;
pub mod task_query;
pub mod task_set;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use entities::*;
pub use operation::StoreOperation;
pub use scheduler_errors::{CompositionError, StoreError, StoreResult};
pub use storage_ext::StorageExt;
pub use stores::*;
pub use task_query::TaskQuery;
pub use task_set::TaskSet;
