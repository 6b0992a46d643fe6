//! Snapshot of everything the overlay UI shows.
//!
//! The tracker never talks to the DOM. It emits [`Signal`]s which are folded
//! into a [`PresentationState`]; the host renders whatever the latest
//! snapshot says. Mute, menu and cursor live in [`Controls`] and never feed
//! back into discovery.

use serde::{Deserialize, Serialize};

use crate::category::{TargetCategory, TOTAL_CATEGORY_COUNT};

pub const HALFWAY_MESSAGE: &str = "Halfway there!";
pub const ALMOST_MESSAGE: &str = "Almost there!";
pub const THANK_YOU_TEXT: &str = "Thank you for visiting!";

/// Cursor affordance over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

impl CursorStyle {
    /// CSS `cursor` value.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
        }
    }
}

/// Presentation update produced by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    SetModal(Option<TargetCategory>),
    Notify { message: String, duration_ms: u64 },
    ClearNotification,
    SetProgress { found: usize, total: usize },
    SetCompletionCue(bool),
    SetCelebration(bool),
}

/// UI state unrelated to discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub muted: bool,
    pub intro_visible: bool,
    pub cursor: CursorStyle,
}

impl Controls {
    pub fn new(muted: bool, intro_visible: bool) -> Self {
        Self {
            muted,
            intro_visible,
            cursor: CursorStyle::Default,
        }
    }

    /// Flips the mute flag and returns whether audio should now be playing.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        !self.muted
    }

    pub fn show_intro(&mut self) {
        self.intro_visible = true;
    }

    pub fn dismiss_intro(&mut self) {
        self.intro_visible = false;
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Latest snapshot for the overlay UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationState {
    pub modal: Option<TargetCategory>,
    pub toast: Option<String>,
    pub found: usize,
    pub total: usize,
    pub completion_cue: bool,
    pub celebration: bool,
    pub controls: Controls,
}

impl PresentationState {
    pub fn new(controls: Controls) -> Self {
        Self {
            modal: None,
            toast: None,
            found: 0,
            total: TOTAL_CATEGORY_COUNT,
            completion_cue: false,
            celebration: false,
            controls,
        }
    }

    pub fn apply(&mut self, signal: &Signal) {
        match signal {
            Signal::SetModal(modal) => self.modal = *modal,
            Signal::Notify { message, .. } => self.toast = Some(message.clone()),
            Signal::ClearNotification => self.toast = None,
            Signal::SetProgress { found, total } => {
                self.found = *found;
                self.total = *total;
            }
            Signal::SetCompletionCue(visible) => self.completion_cue = *visible,
            Signal::SetCelebration(visible) => self.celebration = *visible,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.found == self.total
    }

    /// Counter text, with a check mark once everything is found.
    pub fn progress_text(&self) -> String {
        if self.is_complete() {
            format!("✓ {}/{}", self.found, self.total)
        } else {
            format!("{}/{}", self.found, self.total)
        }
    }

    pub fn completion_cue_text(&self) -> Option<String> {
        self.completion_cue
            .then(|| format!("{}/{} complete!", self.total, self.total))
    }

    pub fn modal_content(&self) -> Option<ModalContent> {
        self.modal.and_then(ModalContent::for_category)
    }
}

/// Heading and paragraphs shown inside an info modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalContent {
    pub title: &'static str,
    pub sections: &'static [ModalSection],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalSection {
    pub heading: Option<&'static str>,
    pub body: &'static str,
}

const fn section(heading: &'static str, body: &'static str) -> ModalSection {
    ModalSection {
        heading: Some(heading),
        body,
    }
}

const fn paragraph(body: &'static str) -> ModalSection {
    ModalSection {
        heading: None,
        body,
    }
}

const TECH_STACK: &[ModalSection] = &[
    section("Frontend", "HTML, JavaScript, TypeScript, React."),
    section("Backend", "Python, Node.js, REST API."),
    section("Sysadmin", "Bash, PowerShell, Git, GitHub Actions."),
    section("Cloud", "AWS, Azure."),
    section("3D & Graphics", "Blender 3D, Three.js."),
    section("Others", "MongoDB, MySQL, Next.js, Prisma ORM."),
];

const GUITAR: &[ModalSection] = &[paragraph(
    "Music is a big part of my life. I play guitar in my spare time, mostly acoustic, \
     from fingerstyle to strumming. It's a great way to unwind and stay creative outside of coding.",
)];

const MODELING: &[ModalSection] = &[paragraph(
    "I also like 3D and modeling in my free time using Blender 3D. It's a fun way to create \
     assets and scenes, and it ties in nicely with WebGL and Three.js for bringing them to the web.",
)];

const WELCOME: &[ModalSection] = &[paragraph(
    "Have a seat and enjoy. Make yourself at home, stay as long as you like and explore.",
)];

const BOOK: &[ModalSection] = &[
    paragraph("\u{201c}The quieter you become, the more you can hear.\u{201d}"),
    paragraph("Kali Linux"),
];

const LANTERN: &[ModalSection] = &[paragraph(
    "How dare you try to switch to light mode. It's always dark mode here, \
     and this lantern is the only light you get.",
)];

impl ModalContent {
    /// Content for a modal category; `None` for categories without a modal.
    pub fn for_category(category: TargetCategory) -> Option<Self> {
        let (title, sections) = match category {
            TargetCategory::Link => return None,
            TargetCategory::TechStack => ("Tech Stack", TECH_STACK),
            TargetCategory::Instrument => ("Guitar", GUITAR),
            TargetCategory::Sculpture => ("3D & Modeling", MODELING),
            TargetCategory::Seating => ("Welcome", WELCOME),
            TargetCategory::Literature => ("Book", BOOK),
            TargetCategory::Lantern => ("Lantern", LANTERN),
        };
        Some(Self { title, sections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_text_marks_completion() {
        let mut state = PresentationState::new(Controls::default());
        state.apply(&Signal::SetProgress { found: 3, total: 7 });
        assert_eq!(state.progress_text(), "3/7");
        state.apply(&Signal::SetProgress { found: 7, total: 7 });
        assert_eq!(state.progress_text(), "✓ 7/7");
    }

    #[test]
    fn toast_is_replaced_and_cleared() {
        let mut state = PresentationState::new(Controls::default());
        state.apply(&Signal::Notify {
            message: HALFWAY_MESSAGE.into(),
            duration_ms: 2500,
        });
        state.apply(&Signal::Notify {
            message: ALMOST_MESSAGE.into(),
            duration_ms: 2500,
        });
        assert_eq!(state.toast.as_deref(), Some(ALMOST_MESSAGE));
        state.apply(&Signal::ClearNotification);
        assert_eq!(state.toast, None);
    }

    #[test]
    fn completion_cue_text_only_when_shown() {
        let mut state = PresentationState::new(Controls::default());
        assert_eq!(state.completion_cue_text(), None);
        state.apply(&Signal::SetCompletionCue(true));
        assert_eq!(state.completion_cue_text().as_deref(), Some("7/7 complete!"));
    }

    #[test]
    fn every_modal_category_has_content() {
        for category in TargetCategory::ALL {
            let content = ModalContent::for_category(category);
            assert_eq!(content.is_none(), category.is_external());
        }
        let tech = ModalContent::for_category(TargetCategory::TechStack).unwrap();
        assert_eq!(tech.title, "Tech Stack");
        assert_eq!(tech.sections.len(), 6);
    }

    #[test]
    fn mute_toggle_reports_playback() {
        let mut controls = Controls::default();
        assert!(controls.muted);
        assert!(controls.toggle_mute());
        assert!(!controls.toggle_mute());
    }
}
