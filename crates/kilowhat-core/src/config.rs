//! Component options.
//!
//! Options arrive from the host page as JSON or JS objects, so every field is
//! optional on the wire and falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UiError};

/// Default typewriter timings in milliseconds.
pub const TYPE_SPEED_MS: u32 = 70;
pub const ERASE_SPEED_MS: u32 = 50;
pub const DISPLAY_DURATION_MS: u32 = 3000;
pub const PAUSE_BETWEEN_MS: u32 = 500;
pub const INITIAL_DELAY_MS: u32 = 100;

/// Taglines cycled by the header typewriter when none are configured.
pub const TAGLINES: &[&str] = &[
    "git commit -m 'still believing'",
    "segfault optimism since 2024",
    "try { hope() } catch { blog() }",
    "npm install faith --save-dev",
    "sudo make me believe",
    "undefined is not a feeling",
    "console.log('everything is fine')",
    "AI won't replace my anxiety",
    "docker run -it hope:latest",
    "// TODO: fix everything",
    "merge conflicts with reality",
    "stack overflow but make it poetry",
    "kubernetes for my emotions",
    "cached optimism (expires: never)",
    "rm -rf doubts 2>/dev/null",
    "404: pessimism not found",
    "debugging life in production",
    "ctrl+z doesn't work here",
    "async/await the apocalypse",
    "<div class='silver-lining' />",
];

/// Lightbox options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightboxOptions {
    /// Fraction of the viewport height a swipe must travel to dismiss.
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,

    /// Release velocity (px/ms) that dismisses regardless of distance.
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,

    /// Upper pinch zoom bound.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Lower pinch zoom bound.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f64,

    /// Close animation length in milliseconds.
    #[serde(default = "default_animation_duration")]
    pub animation_duration: u32,
}

/// Typewriter options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypewriterOptions {
    /// Phrases to cycle through.
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,

    /// Delay between typed characters.
    #[serde(default = "default_type_speed")]
    pub type_speed: u32,

    /// Delay between erased characters.
    #[serde(default = "default_erase_speed")]
    pub erase_speed: u32,

    /// How long a fully typed phrase stays on screen.
    #[serde(default = "default_display_duration")]
    pub display_duration: u32,

    /// Gap between erasing one phrase and typing the next.
    #[serde(default = "default_pause_duration")]
    pub pause_duration: u32,

    /// Delay before the first character of a run.
    #[serde(default = "default_initial_delay")]
    pub initial_delay: u32,

    /// Announce completed phrases through the live region.
    #[serde(default = "default_true")]
    pub announce_to_screen_reader: bool,

    /// Pause while the page is hidden and resume when it becomes visible.
    #[serde(default = "default_true")]
    pub pause_when_hidden: bool,
}

// Default value functions
fn default_swipe_threshold() -> f64 {
    0.15
}

fn default_velocity_threshold() -> f64 {
    0.5
}

fn default_max_zoom() -> f64 {
    3.0
}

fn default_min_zoom() -> f64 {
    0.5
}

fn default_animation_duration() -> u32 {
    300
}

fn default_phrases() -> Vec<String> {
    TAGLINES.iter().map(|s| s.to_string()).collect()
}

fn default_type_speed() -> u32 {
    TYPE_SPEED_MS
}

fn default_erase_speed() -> u32 {
    ERASE_SPEED_MS
}

fn default_display_duration() -> u32 {
    DISPLAY_DURATION_MS
}

fn default_pause_duration() -> u32 {
    PAUSE_BETWEEN_MS
}

fn default_initial_delay() -> u32 {
    INITIAL_DELAY_MS
}

fn default_true() -> bool {
    true
}

impl Default for LightboxOptions {
    fn default() -> Self {
        Self {
            swipe_threshold: default_swipe_threshold(),
            velocity_threshold: default_velocity_threshold(),
            max_zoom: default_max_zoom(),
            min_zoom: default_min_zoom(),
            animation_duration: default_animation_duration(),
        }
    }
}

impl Default for TypewriterOptions {
    fn default() -> Self {
        Self {
            phrases: default_phrases(),
            type_speed: default_type_speed(),
            erase_speed: default_erase_speed(),
            display_duration: default_display_duration(),
            pause_duration: default_pause_duration(),
            initial_delay: default_initial_delay(),
            announce_to_screen_reader: true,
            pause_when_hidden: true,
        }
    }
}

impl LightboxOptions {
    /// Parse options from a JSON string and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values the gesture math cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.swipe_threshold.is_finite() && self.swipe_threshold > 0.0) {
            return Err(UiError::config(format!(
                "swipeThreshold must be a positive number, got {}",
                self.swipe_threshold
            )));
        }

        if !(self.velocity_threshold.is_finite() && self.velocity_threshold > 0.0) {
            return Err(UiError::config(format!(
                "velocityThreshold must be a positive number, got {}",
                self.velocity_threshold
            )));
        }

        if !(self.min_zoom.is_finite() && self.max_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(UiError::config("zoom bounds must be positive numbers"));
        }

        if self.min_zoom > self.max_zoom {
            return Err(UiError::config(format!(
                "minZoom ({}) exceeds maxZoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }

        Ok(())
    }

    /// Clamp a zoom factor into the configured bounds.
    pub fn clamp_zoom(&self, scale: f64) -> f64 {
        scale.clamp(self.min_zoom, self.max_zoom)
    }
}

impl TypewriterOptions {
    /// Parse options from a JSON string and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// The cycler needs at least one phrase to index into.
    pub fn validate(&self) -> Result<()> {
        if self.phrases.is_empty() {
            return Err(UiError::config("typewriter needs at least one phrase"));
        }
        Ok(())
    }
}
