//! Credential refresh scheduling
//!
//! Keeps every credential's code and countdown in sync with wall-clock
//! time and publishes the result to subscribers.

pub mod clock;
pub mod handle;
pub mod refresh;
pub mod timer;

// Public re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use handle::{SchedulerCommand, SchedulerHandle};
pub use refresh::{RefreshScheduler, SchedulerPolicy};
pub use timer::TimerState;
