pub mod queue;
pub mod timer;

pub use queue::{TimerHandle, TimerQueue};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
