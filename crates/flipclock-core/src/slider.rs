//! Two-slide navigator between the clock and the timer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slide {
    Clock,
    Timer,
}

impl Slide {
    pub const ALL: [Slide; 2] = [Slide::Clock, Slide::Timer];
}

#[derive(Debug, Default)]
pub struct Slider {
    index: usize,
}

impl Slider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Slide {
        Slide::ALL[self.index]
    }

    /// Jump to `index`, clamped to the last slide.
    pub fn go_to(&mut self, index: usize) -> Slide {
        self.index = index.min(Slide::ALL.len() - 1);
        self.current()
    }

    /// Forward one slide; stays put on the last.
    pub fn next(&mut self) -> Slide {
        self.go_to(self.index + 1)
    }

    /// Back one slide; stays put on the first.
    pub fn prev(&mut self) -> Slide {
        self.go_to(self.index.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigates_without_wrapping() {
        let mut slider = Slider::new();
        assert_eq!(slider.current(), Slide::Clock);
        assert_eq!(slider.prev(), Slide::Clock);
        assert_eq!(slider.next(), Slide::Timer);
        assert_eq!(slider.next(), Slide::Timer);
        assert_eq!(slider.prev(), Slide::Clock);
    }

    #[test]
    fn go_to_clamps() {
        let mut slider = Slider::new();
        assert_eq!(slider.go_to(7), Slide::Timer);
        assert_eq!(slider.index(), 1);
        assert_eq!(slider.go_to(0), Slide::Clock);
    }
}
