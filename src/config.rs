use serde::{Deserialize, Serialize};

pub const DEFAULT_TOAST_DURATION_MS: u64 = 2500;
pub const DEFAULT_COMPLETION_CUE_DELAY_MS: u64 = 1500;
pub const DEFAULT_EXTERNAL_LINK_URL: &str = "https://github.com/oCHRONOSo";
pub const DEFAULT_TARGET_MARKER: &str = "target";
pub const DEFAULT_HOVER_SCALE: f32 = 1.2;

/// Tunables for a discovery session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a milestone toast stays up unless replaced.
    pub toast_duration_ms: u64,
    /// Delay between the completion cue and the thank-you overlay.
    pub completion_cue_delay_ms: u64,
    /// Destination opened by the `link` target.
    pub external_link_url: String,
    /// Substring that marks a scene node as a target.
    pub marker: String,
    pub hover_scale: f32,
    pub start_muted: bool,
    pub show_intro: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
            completion_cue_delay_ms: DEFAULT_COMPLETION_CUE_DELAY_MS,
            external_link_url: DEFAULT_EXTERNAL_LINK_URL.to_string(),
            marker: DEFAULT_TARGET_MARKER.to_string(),
            hover_scale: DEFAULT_HOVER_SCALE,
            start_muted: true,
            show_intro: true,
        }
    }
}
