use std::any::Any;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_channel::Sender;
use serde::Deserialize;
use serde::Serialize;

use super::handles::MapHandle;
use super::registry::deregister_task;
use super::registry::register_task;
use super::registry::RegisteredTask;
use super::ErrorKind;
use super::Result;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token for a launched [`Task`].
///
/// Allocated from a process-wide counter so two tasks never share an id,
/// even across detach and join.
///
/// [`Task`]: struct.Task.html
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn next() -> TaskId {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// A launched unit of work, returned by [`Builder::spawn`].
///
/// A `Task` starts joinable and stays joinable until it is resolved exactly
/// once, by [`Task::join`] or [`Task::detach`]. Dropping an unresolved `Task`
/// detaches it; the join-on-drop discipline is provided by the handle types
/// ([`TaskGuard`], [`ScopedTask`], [`TaskHandle`]) layered on top.
///
/// [`Builder::spawn`]: struct.Builder.html#method.spawn
/// [`Task::join`]: struct.Task.html#method.join
/// [`Task::detach`]: struct.Task.html#method.detach
/// [`TaskGuard`]: struct.TaskGuard.html
/// [`ScopedTask`]: struct.ScopedTask.html
/// [`TaskHandle`]: struct.TaskHandle.html
pub struct Task<T: Send + 'static> {
    done: Receiver<()>,
    id: TaskId,
    join: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> Task<T> {
    pub(crate) fn new(id: TaskId, join: JoinHandle<T>, done: Receiver<()>) -> Task<T> {
        let join = Some(join);
        Task { done, id, join }
    }

    /// Identity token for this task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Check if [`Task::join`] or [`Task::detach`] may currently succeed.
    ///
    /// [`Task::join`]: struct.Task.html#method.join
    /// [`Task::detach`]: struct.Task.html#method.detach
    pub fn is_joinable(&self) -> bool {
        self.join.is_some()
    }

    /// Check if the task's thread has exited, without blocking.
    ///
    /// Only meaningful while the task is still joinable.
    pub fn is_finished(&self) -> bool {
        !self.done.is_empty()
    }

    /// Waits for the task to complete and returns its result.
    ///
    /// If the task panicked the panic message is returned as
    /// [`ErrorKind::Panic`].
    ///
    /// [`ErrorKind::Panic`]: enum.ErrorKind.html#variant.Panic
    pub fn join(&mut self) -> Result<T> {
        let handle = self.join.take();
        if handle.is_none() {
            return Err(ErrorKind::NotJoinable.into());
        }
        handle
            .expect("the handle should be Some here")
            .join()
            .map_err(|payload| ErrorKind::Panic(panic_message(payload)).into())
    }

    /// Similar to [`Task::join`] but does not block forever.
    ///
    /// On timeout the task is left unresolved and still joinable.
    ///
    /// [`Task::join`]: struct.Task.html#method.join
    pub fn join_timeout(&mut self, timeout: Duration) -> Result<T> {
        if self.join.is_none() {
            return Err(ErrorKind::NotJoinable.into());
        }
        match self.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => Err(ErrorKind::JoinTimeout.into()),
            _ => self
                .join
                .take()
                .expect("the handle should be Some here")
                .join()
                .map_err(|payload| ErrorKind::Panic(panic_message(payload)).into()),
        }
    }

    /// Relinquish interest in the task without waiting for it.
    ///
    /// The task continues running and the runtime reclaims it on completion.
    pub fn detach(&mut self) -> Result<()> {
        match self.join.take() {
            Some(handle) => {
                drop(handle);
                Ok(())
            }
            None => Err(ErrorKind::NotJoinable.into()),
        }
    }

    /// Consume the task into a [`MapHandle`] that transforms the join result.
    ///
    /// [`MapHandle`]: struct.MapHandle.html
    pub fn map<U, F>(self, map: F) -> MapHandle<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        let id = self.id;
        let done = self.done.clone();
        let mut task = self;
        MapHandle::new(id, done, move || task.join().map(map))
    }
}

/// Task lifecycle guard.
///
/// Created inside the spawned thread and dropped only when the thread exits,
/// either by returning or by unwinding. On drop it signals completion to the
/// parent-side [`Task`] and removes the task from the registry, so detached
/// tasks deregister themselves too.
///
/// [`Task`]: struct.Task.html
pub(crate) struct TaskLifecycleGuard {
    done: Sender<()>,
    id: TaskId,
}

impl TaskLifecycleGuard {
    pub(crate) fn new(id: TaskId, name: String, done: Sender<()>) -> TaskLifecycleGuard {
        register_task(RegisteredTask::new(id, name));
        TaskLifecycleGuard { done, id }
    }
}

impl Drop for TaskLifecycleGuard {
    fn drop(&mut self) {
        // Signal completion to the parent side but ignore errors:
        // the Task may have been detached and dropped already.
        let _ = self.done.try_send(());
        deregister_task(self.id);
    }
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "<non-string panic payload>".to_string(),
        },
    }
}
