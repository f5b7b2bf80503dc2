pub mod attributes;
pub mod deploy;
pub mod job;
pub mod lock;
pub mod quota;
pub mod task;

pub use attributes::*;
pub use deploy::*;
pub use job::*;
pub use lock::*;
pub use quota::*;
pub use task::*;
