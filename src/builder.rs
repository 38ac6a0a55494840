use std::thread::Builder as StdBuilder;

use failure::ResultExt;

use super::task::TaskLifecycleGuard;
use super::ErrorKind;
use super::Result;
use super::Task;
use super::TaskId;

/// Task factory to configure the properties of a new task.
///
/// Tasks wrap [`std::thread`]s and add a few guarantees on top:
///
///   * Every task has an identity and is visible in [`running_tasks`]
///     until its thread exits, even after a detach.
///   * The returned [`Task`] can be wrapped in a handle that joins it on
///     scope exit, so no exit path of the caller leaks a running thread.
///
/// The spawned closure must be `Send + 'static`: a task owns its input
/// before it starts running. Data shared with the caller has to go through
/// an explicit wrapper such as [`Arc`] or a channel, never a plain borrow.
///
/// [`std::thread`]: https://doc.rust-lang.org/std/thread/index.html
/// [`running_tasks`]: fn.running_tasks.html
/// [`Task`]: struct.Task.html
/// [`Arc`]: https://doc.rust-lang.org/std/sync/struct.Arc.html
pub struct Builder {
    name: String,
    std: StdBuilder,
}

impl Builder {
    pub fn new<S: Into<String>>(name: S) -> Builder {
        let name = name.into();
        let std = StdBuilder::new().name(name.clone());
        Builder { name, std }
    }

    /// Set the stack size, in bytes, for the task's thread.
    pub fn stack_size(mut self, size: usize) -> Builder {
        self.std = self.std.stack_size(size);
        self
    }

    /// Spawns a new task by taking ownership of the Builder.
    ///
    /// On success a [`Task`] handle is returned.
    ///
    /// [`Task`]: struct.Task.html
    pub fn spawn<F, T>(self, f: F) -> Result<Task<T>>
    where
        F: FnOnce() -> T,
        F: Send + 'static,
        T: Send + 'static,
    {
        let id = TaskId::next();
        let name = self.name;
        let (done_send, done_recv) = crossbeam_channel::bounded(1);
        let join = self
            .std
            .spawn(move || {
                // Keep a TaskLifecycleGuard alive as long as the task is.
                let _guard = TaskLifecycleGuard::new(id, name, done_send);
                f()
            })
            .with_context(|_| ErrorKind::Spawn)?;
        Ok(Task::new(id, join, done_recv))
    }
}

#[cfg(test)]
mod tests {
    use super::Builder;

    #[test]
    fn spawn_and_join() {
        Builder::new("spawn_and_join")
            .spawn(|| ())
            .expect("failed to spawn task")
            .join()
            .expect("failed to join task");
    }

    #[test]
    fn spawn_names_the_thread() {
        let name = Builder::new("spawn_names_the_thread")
            .spawn(|| ::std::thread::current().name().map(String::from))
            .expect("failed to spawn task")
            .join()
            .expect("failed to join task");
        assert_eq!(Some("spawn_names_the_thread".to_string()), name);
    }

    #[test]
    fn spawn_with_stack_size() {
        let value = Builder::new("spawn_with_stack_size")
            .stack_size(64 * 1024)
            .spawn(|| 7)
            .expect("failed to spawn task")
            .join()
            .expect("failed to join task");
        assert_eq!(7, value);
    }

    #[test]
    fn tasks_have_distinct_ids() {
        let mut first = Builder::new("tasks_have_distinct_ids_1")
            .spawn(|| ())
            .expect("failed to spawn task");
        let mut second = Builder::new("tasks_have_distinct_ids_2")
            .spawn(|| ())
            .expect("failed to spawn task");
        assert_ne!(first.id(), second.id());
        first.join().expect("failed to join task");
        second.join().expect("failed to join task");
    }
}
