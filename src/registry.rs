use std::collections::HashMap;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;

use super::task::TaskId;

lazy_static::lazy_static! {
    static ref TASKS_REGISTRY: Mutex<HashMap<TaskId, RegisteredTask>> = {
        Mutex::new(HashMap::new())
    };
}

/// Internal record for a task whose thread has not exited yet.
pub(crate) struct RegisteredTask {
    id: TaskId,
    name: String,
}

impl RegisteredTask {
    pub(crate) fn new(id: TaskId, name: String) -> RegisteredTask {
        RegisteredTask { id, name }
    }
}

/// Removes the record for a task whose thread exited.
pub(crate) fn deregister_task(id: TaskId) {
    TASKS_REGISTRY
        .lock()
        .expect("global TASKS_REGISTRY lock poisoned")
        .remove(&id);
}

/// Insert the record for a newly launched task.
pub(crate) fn register_task(task: RegisteredTask) {
    TASKS_REGISTRY
        .lock()
        .expect("global TASKS_REGISTRY lock poisoned")
        .insert(task.id, task);
}

/// Return a snapshot of the tasks currently running.
///
/// Registration happens from inside the task's own thread so a task spawned
/// a moment ago may not be in the snapshot yet. Detached tasks stay in the
/// snapshot until their thread exits.
pub fn running_tasks() -> Vec<TaskStatus> {
    TASKS_REGISTRY
        .lock()
        .expect("global TASKS_REGISTRY lock poisoned")
        .iter()
        .map(|(_, task)| task.into())
        .collect()
}

/// Public view of a point in time status of a task.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct TaskStatus {
    /// Identity token of the running task.
    pub id: TaskId,

    /// Name the task was spawned with.
    pub name: String,
}

impl From<&RegisteredTask> for TaskStatus {
    fn from(task: &RegisteredTask) -> TaskStatus {
        TaskStatus {
            id: task.id,
            name: task.name.clone(),
        }
    }
}
