mod progress;
mod runner;
mod session;
mod state;

pub use progress::{AttemptOutcome, ProgressEvent, ProgressSink, ProgressSnapshot};
pub use runner::{BatchRunner, Pacing};
pub use session::{BatchHandle, BatchSession};
pub use state::{BatchState, BatchStatus, GeneratedImage};
