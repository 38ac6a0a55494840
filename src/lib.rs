mod builder;
mod error;
mod handles;
mod registry;
mod task;

#[cfg(any(test, feature = "with_test_support"))]
pub mod test_support;

pub use self::builder::Builder;
pub use self::error::Error;
pub use self::error::ErrorKind;
pub use self::error::Result;
pub use self::handles::MapHandle;
pub use self::handles::ScopedTask;
pub use self::handles::TaskGuard;
pub use self::handles::TaskHandle;
pub use self::registry::running_tasks;
pub use self::registry::TaskStatus;
pub use self::task::Task;
pub use self::task::TaskId;
