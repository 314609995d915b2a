mod driver;
mod engine;
mod state;

pub use driver::{Clock, IntervalDriver, ManualClock, SystemClock, TickDriver};
pub use engine::{Command, TimerEngine, TimerView};
pub use state::{format_mm_ss, EditTarget, Phase, TimerState, TimerStatus};
