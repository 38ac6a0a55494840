use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;

use super::super::ErrorKind;
use super::super::Result;
use super::super::TaskId;

/// Task handle that maps the result of a join operation.
///
/// Created by [`Task::map`]. Like the owning handles, a `MapHandle` joins
/// the underlying task on drop if it was not resolved explicitly.
///
/// [`Task::map`]: struct.Task.html#method.map
pub struct MapHandle<T: Send + 'static> {
    done: Receiver<()>,
    id: TaskId,
    join: Option<Box<dyn FnOnce() -> Result<T>>>,
}

impl<T: Send + 'static> MapHandle<T> {
    pub(crate) fn new<F>(id: TaskId, done: Receiver<()>, join: F) -> MapHandle<T>
    where
        F: FnOnce() -> Result<T> + 'static,
    {
        MapHandle {
            done,
            id,
            join: Some(Box::new(join)),
        }
    }

    /// Identity of the underlying task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Check if [`MapHandle::join`] may currently succeed.
    ///
    /// [`MapHandle::join`]: struct.MapHandle.html#method.join
    pub fn is_joinable(&self) -> bool {
        self.join.is_some()
    }

    /// Same as [`Task::join`] but applies the transformation to the result.
    ///
    /// [`Task::join`]: struct.Task.html#method.join
    pub fn join(&mut self) -> Result<T> {
        let handle = self.join.take();
        let handle = match handle {
            Some(handle) => handle,
            None => return Err(ErrorKind::NotJoinable.into()),
        };
        handle()
    }

    /// Same as [`Task::join_timeout`] but applies the transformation to the result.
    ///
    /// [`Task::join_timeout`]: struct.Task.html#method.join_timeout
    pub fn join_timeout(&mut self, timeout: Duration) -> Result<T> {
        if self.join.is_none() {
            return Err(ErrorKind::NotJoinable.into());
        }
        match self.done.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => Err(ErrorKind::JoinTimeout.into()),
            _ => self.join.take().expect("the handle should be Some here")(),
        }
    }
}

impl<T: Send + 'static> Drop for MapHandle<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.join.take() {
            let _ = handle();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::super::test_support::Gate;
    use super::super::super::Builder;
    use super::super::super::ErrorKind;

    #[test]
    fn spawn_and_join() {
        let flag: bool = Builder::new("spawn_and_join")
            .spawn(|| ())
            .expect("failed to spawn task")
            .map(|_| true)
            .join()
            .expect("failed to join task");
        assert_eq!(true, flag);
    }

    #[test]
    fn join_twice_fails() {
        let mut handle = Builder::new("join_twice_fails")
            .spawn(|| 2)
            .expect("failed to spawn task")
            .map(|value| value * 2);
        assert_eq!(4, handle.join().expect("failed to join task"));
        assert_eq!(false, handle.is_joinable());
        let error = handle.join().expect_err("second join to fail");
        assert_eq!(&ErrorKind::NotJoinable, error.kind());
    }

    #[test]
    fn join_timeout_then_success() {
        let mut gate = Gate::new();
        let waiter = gate.waiter();
        let mut handle = Builder::new("join_timeout_then_success")
            .spawn(move || {
                waiter.wait();
                1
            })
            .expect("failed to spawn task")
            .map(|value| value + 1);
        let error = handle
            .join_timeout(Duration::from_millis(20))
            .expect_err("join to time out");
        assert_eq!(&ErrorKind::JoinTimeout, error.kind());
        gate.open();
        let value = handle
            .join_timeout(Duration::from_secs(5))
            .expect("the task to complete");
        assert_eq!(2, value);
    }

    #[test]
    fn drop_joins_the_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = Arc::clone(&counter);
        {
            let _handle = Builder::new("drop_joins_the_task")
                .spawn(move || {
                    task_counter.fetch_add(1, Ordering::SeqCst);
                })
                .expect("failed to spawn task")
                .map(|_| ());
        }
        assert_eq!(1, counter.load(Ordering::SeqCst));
    }
}
