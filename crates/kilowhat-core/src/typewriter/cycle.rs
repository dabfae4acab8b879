//! The type → display → erase → pause loop as an explicit state machine.
//!
//! [`Cycle::advance`] performs the work of the current phase and says how
//! long to wait before the next call. It never touches timers itself; the
//! driver in the parent module owns scheduling and cancellation.

use crate::{
    config::TypewriterOptions,
    motion::effective_duration,
    platform::Environment,
};

/// Durations for one step, already adjusted for reduced motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub type_speed: u32,
    pub erase_speed: u32,
    pub display_duration: u32,
    pub pause_duration: u32,
}

impl Timings {
    pub fn effective(options: &TypewriterOptions, environment: &dyn Environment) -> Self {
        Self {
            type_speed: effective_duration(environment, options.type_speed),
            erase_speed: effective_duration(environment, options.erase_speed),
            display_duration: effective_duration(environment, options.display_duration),
            pause_duration: effective_duration(environment, options.pause_duration),
        }
    }
}

/// Where the loop is within the current phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `shown` characters are on screen.
    Typing { shown: usize },
    /// The full phrase is on screen.
    Displaying,
    /// `shown` characters are left on screen.
    Erasing { shown: usize },
    /// The phrase is gone; the next step moves to the next phrase.
    Pausing,
}

/// How long the driver waits before advancing again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Wait this many milliseconds. Zero continues in the same tick.
    After(u32),
    /// Continue on a fresh tick even though no time needs to pass.
    Yield,
}

/// Observable outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// Show this text with the cursor.
    Render(String),
    /// A phrase has been typed in full.
    PhraseComplete { phrase: String, index: usize },
    /// The index wrapped back to the first phrase.
    CycleComplete,
}

#[derive(Debug, Clone)]
pub struct Cycle {
    phrases: Vec<String>,
    index: usize,
    phase: Phase,
}

impl Cycle {
    /// `phrases` must not be empty.
    pub fn new(phrases: Vec<String>) -> Self {
        Self {
            phrases,
            index: 0,
            phase: Phase::Typing { shown: 0 },
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_phrase(&self) -> &str {
        self.phrases.get(self.index).map_or("", String::as_str)
    }

    /// Go back to the first character of the current phrase.
    pub fn restart_phrase(&mut self) {
        self.phase = Phase::Typing { shown: 0 };
    }

    /// Go back to the first phrase.
    pub fn reset(&mut self) {
        self.index = 0;
        self.restart_phrase();
    }

    pub fn advance(&mut self, timings: &Timings) -> (Step, Option<CycleEvent>) {
        let length = self.current_phrase().chars().count();

        match self.phase {
            Phase::Typing { shown } if shown < length => {
                if timings.type_speed == 0 {
                    self.phase = Phase::Typing { shown: length };
                    (Step::After(0), Some(self.render(length)))
                } else {
                    self.phase = Phase::Typing { shown: shown + 1 };
                    (Step::After(timings.type_speed), Some(self.render(shown + 1)))
                }
            }
            Phase::Typing { .. } => {
                self.phase = Phase::Displaying;
                let event = CycleEvent::PhraseComplete {
                    phrase: self.current_phrase().to_string(),
                    index: self.index,
                };
                (Step::After(timings.display_duration), Some(event))
            }
            Phase::Displaying => {
                self.phase = Phase::Erasing { shown: length };
                (Step::After(0), None)
            }
            Phase::Erasing { shown } if shown > 0 => {
                if timings.erase_speed == 0 {
                    self.phase = Phase::Pausing;
                    (Step::After(timings.pause_duration), Some(self.render(0)))
                } else {
                    self.phase = Phase::Erasing { shown: shown - 1 };
                    (Step::After(timings.erase_speed), Some(self.render(shown - 1)))
                }
            }
            Phase::Erasing { .. } => {
                self.phase = Phase::Pausing;
                (Step::After(timings.pause_duration), None)
            }
            Phase::Pausing => {
                self.index = (self.index + 1) % self.phrases.len().max(1);
                self.phase = Phase::Typing { shown: 0 };
                let event = (self.index == 0).then_some(CycleEvent::CycleComplete);
                (Step::Yield, event)
            }
        }
    }

    fn render(&self, chars: usize) -> CycleEvent {
        CycleEvent::Render(prefix(self.current_phrase(), chars).to_string())
    }
}

/// The first `chars` characters of `text`.
fn prefix(text: &str, chars: usize) -> &str {
    text.char_indices()
        .nth(chars)
        .map_or(text, |(offset, _)| &text[..offset])
}
