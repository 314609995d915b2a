//! Flip-card wall clock: digit faces, change detection, zoom overlay and
//! embed parameters.

mod embed;
mod face;
mod zoom;

pub use embed::{EmbedOptions, Theme, WidgetSize};
pub use face::{ClockFace, DigitGroup, DigitSlot, FlipClock, Meridiem};
pub use zoom::ClockZoom;
