use std::fmt;

use failure::Backtrace;
use failure::Context;
use failure::Fail;

/// Error returned by fallible operations in this crate.
#[derive(Debug)]
pub struct Error(Context<ErrorKind>);

impl Error {
    /// Access the [`ErrorKind`] that describes this failure.
    ///
    /// [`ErrorKind`]: enum.ErrorKind.html
    pub fn kind(&self) -> &ErrorKind {
        self.0.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.0.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.0.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, fmt)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(context: Context<ErrorKind>) -> Error {
        Error(context)
    }
}

/// Exhaustive list of possible failures.
///
/// `InvalidTask` and `NotJoinable` report contract violations by the caller,
/// not transient conditions: retrying the same call cannot succeed.
#[derive(Debug, Fail, Eq, PartialEq)]
pub enum ErrorKind {
    /// The handle requires a joinable task but the given task was already resolved.
    #[fail(display = "task is not in a joinable state")]
    InvalidTask,

    /// The task did not complete within the given timeout.
    #[fail(display = "timed out waiting for task to complete")]
    JoinTimeout,

    /// The handle is empty or its task was already joined or detached.
    #[fail(display = "task is not joinable")]
    NotJoinable,

    /// The joined task panicked; the panic message is attached.
    #[fail(display = "task panicked: {}", _0)]
    Panic(String),

    /// The runtime could not start a new thread of execution.
    #[fail(display = "unable to spawn new task")]
    Spawn,
}

/// Short form alias for functions returning `Error`s.
pub type Result<T> = ::std::result::Result<T, Error>;
