use crossbeam_channel::bounded;
use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

/// Holds test tasks at a known point until the test releases them.
///
/// Each task blocks on a [`GateWaiter`] and every waiter unblocks when the
/// gate is opened (or dropped, so a failing test cannot deadlock on it).
///
/// [`GateWaiter`]: struct.GateWaiter.html
pub struct Gate {
    hold: Option<Sender<()>>,
    wait: Receiver<()>,
}

impl Gate {
    pub fn new() -> Gate {
        let (hold, wait) = bounded(0);
        Gate {
            hold: Some(hold),
            wait,
        }
    }

    /// Create a waiter to move into a task.
    pub fn waiter(&self) -> GateWaiter {
        GateWaiter {
            wait: self.wait.clone(),
        }
    }

    /// Release every waiter, current and future.
    pub fn open(&mut self) {
        self.hold.take();
    }
}

impl Default for Gate {
    fn default() -> Gate {
        Gate::new()
    }
}

/// Blocks a task until its [`Gate`] is opened.
///
/// [`Gate`]: struct.Gate.html
#[derive(Clone)]
pub struct GateWaiter {
    wait: Receiver<()>,
}

impl GateWaiter {
    /// Block until the gate is opened.
    pub fn wait(&self) {
        // Nothing is ever sent; recv returns once all senders are gone.
        let _ = self.wait.recv();
    }
}
