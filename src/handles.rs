use std::time::Duration;

use super::Builder;
use super::ErrorKind;
use super::Result;
use super::Task;
use super::TaskId;

mod map;

pub use self::map::MapHandle;

/// Joins a borrowed [`Task`] when the guard goes out of scope.
///
/// The guard does not take ownership: the caller still owns the task and the
/// mutable borrow guarantees it outlives the guard and cannot be resolved by
/// anyone else while the guard is alive. If the task was already resolved
/// when the guard drops, nothing happens.
///
/// [`Task`]: struct.Task.html
pub struct TaskGuard<'a, T: Send + 'static> {
    task: &'a mut Task<T>,
}

impl<'a, T: Send + 'static> TaskGuard<'a, T> {
    pub fn new(task: &'a mut Task<T>) -> TaskGuard<'a, T> {
        TaskGuard { task }
    }

    /// Identity of the guarded task.
    pub fn id(&self) -> TaskId {
        self.task.id()
    }
}

impl<'a, T: Send + 'static> Drop for TaskGuard<'a, T> {
    fn drop(&mut self) {
        if self.task.is_joinable() {
            // Drop cannot report failures, a panic in the task is its own concern.
            let _ = self.task.join();
        }
    }
}

/// Owns a [`Task`] that is never empty and is always joined on drop.
///
/// Construction rejects tasks that are not joinable so the handle can uphold
/// the always-joins promise for its whole lifetime.
///
/// [`Task`]: struct.Task.html
pub struct ScopedTask<T: Send + 'static> {
    // Only None after `join` consumed the handle; drop sees None then.
    task: Option<Task<T>>,
}

impl<T: Send + 'static> ScopedTask<T> {
    /// Take ownership of an already-launched task.
    ///
    /// Fails with [`ErrorKind::InvalidTask`] if the task was already joined
    /// or detached.
    ///
    /// [`ErrorKind::InvalidTask`]: enum.ErrorKind.html#variant.InvalidTask
    pub fn new(task: Task<T>) -> Result<ScopedTask<T>> {
        if !task.is_joinable() {
            return Err(ErrorKind::InvalidTask.into());
        }
        Ok(ScopedTask { task: Some(task) })
    }

    /// Launch a new task and wrap it in one step.
    pub fn spawn<S, F>(name: S, f: F) -> Result<ScopedTask<T>>
    where
        S: Into<String>,
        F: FnOnce() -> T,
        F: Send + 'static,
    {
        let task = Builder::new(name).spawn(f)?;
        ScopedTask::new(task)
    }

    /// Identity of the owned task.
    pub fn id(&self) -> TaskId {
        self.as_task().id()
    }

    /// Check if the task's thread has exited, without blocking.
    pub fn is_finished(&self) -> bool {
        self.as_task().is_finished()
    }

    /// Consume the handle, wait for the task and return its result.
    ///
    /// The explicit join exists because drop cannot surface the task's
    /// result or panic.
    pub fn join(mut self) -> Result<T> {
        let mut task = self
            .task
            .take()
            .expect("ScopedTask lost its task before being consumed");
        task.join()
    }

    fn as_task(&self) -> &Task<T> {
        self.task
            .as_ref()
            .expect("ScopedTask lost its task before being consumed")
    }
}

impl<T: Send + 'static> Drop for ScopedTask<T> {
    fn drop(&mut self) {
        if let Some(mut task) = self.task.take() {
            let _ = task.join();
        }
    }
}

/// General-purpose owning handle over zero or one [`Task`].
///
/// The handle may be empty, can be stored in collections and joins any still
/// owned task when dropped. Because drop joins, reassigning a handle first
/// resolves the task it used to own, a running task is never silently
/// abandoned by `handle = other`.
///
/// Ownership is exclusive: the type is move-only and two handles can never
/// race to resolve the same task.
///
/// [`Task`]: struct.Task.html
pub struct TaskHandle<T: Send + 'static> {
    task: Option<Task<T>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Create a handle owning no task.
    pub fn empty() -> TaskHandle<T> {
        TaskHandle { task: None }
    }

    /// Take ownership of an already-launched task.
    pub fn new(task: Task<T>) -> TaskHandle<T> {
        TaskHandle { task: Some(task) }
    }

    /// Launch a new task and take ownership of it.
    pub fn spawn<S, F>(name: S, f: F) -> Result<TaskHandle<T>>
    where
        S: Into<String>,
        F: FnOnce() -> T,
        F: Send + 'static,
    {
        let task = Builder::new(name).spawn(f)?;
        Ok(TaskHandle::new(task))
    }

    /// Identity of the owned task, if any.
    pub fn id(&self) -> Option<TaskId> {
        self.task.as_ref().map(Task::id)
    }

    /// Check if [`TaskHandle::join`] or [`TaskHandle::detach`] may currently succeed.
    ///
    /// [`TaskHandle::join`]: struct.TaskHandle.html#method.join
    /// [`TaskHandle::detach`]: struct.TaskHandle.html#method.detach
    pub fn is_joinable(&self) -> bool {
        match self.task.as_ref() {
            Some(task) => task.is_joinable(),
            None => false,
        }
    }

    /// Wait for the owned task to complete and return its result.
    ///
    /// The handle is empty afterwards. Fails with [`ErrorKind::NotJoinable`]
    /// if the handle is empty or its task was already resolved.
    ///
    /// [`ErrorKind::NotJoinable`]: enum.ErrorKind.html#variant.NotJoinable
    pub fn join(&mut self) -> Result<T> {
        match self.task.take() {
            Some(mut task) => task.join(),
            None => Err(ErrorKind::NotJoinable.into()),
        }
    }

    /// Similar to [`TaskHandle::join`] but does not block forever.
    ///
    /// On timeout the handle keeps ownership and stays joinable.
    ///
    /// [`TaskHandle::join`]: struct.TaskHandle.html#method.join
    pub fn join_timeout(&mut self, timeout: Duration) -> Result<T> {
        let task = match self.task.as_mut() {
            Some(task) => task,
            None => return Err(ErrorKind::NotJoinable.into()),
        };
        let result = task.join_timeout(timeout);
        let timed_out = matches!(&result, Err(error) if error.kind() == &ErrorKind::JoinTimeout);
        if !timed_out {
            self.task = None;
        }
        result
    }

    /// Relinquish interest in the owned task without waiting for it.
    ///
    /// The task continues running independently; the handle is empty
    /// afterwards.
    pub fn detach(&mut self) -> Result<()> {
        match self.task.take() {
            Some(mut task) => task.detach(),
            None => Err(ErrorKind::NotJoinable.into()),
        }
    }

    /// Hand the raw task back to the caller, leaving the handle empty.
    ///
    /// The returned task is no longer joined on drop.
    pub fn take(&mut self) -> Option<Task<T>> {
        self.task.take()
    }
}

impl<T: Send + 'static> From<Task<T>> for TaskHandle<T> {
    fn from(task: Task<T>) -> TaskHandle<T> {
        TaskHandle::new(task)
    }
}

impl<T: Send + 'static> Default for TaskHandle<T> {
    fn default() -> TaskHandle<T> {
        TaskHandle::empty()
    }
}

impl<T: Send + 'static> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        if let Some(mut task) = self.task.take() {
            if task.is_joinable() {
                let _ = task.join();
            }
        }
    }
}
