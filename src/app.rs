use log::debug;

use crate::presentation::{CursorStyle, PresentationState, THANK_YOU_TEXT};
use crate::registry::TargetRegistry;
use crate::session::{Host, Session};
use crate::timer::{ManualClock, ScheduledTimer};

/// Host without a browser: timers run on a [`ManualClock`] and side effects
/// are recorded for inspection.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    pub clock: ManualClock,
    pub opened: Vec<String>,
    pub cursor: CursorStyle,
    pub audio_playing: bool,
    pub frames: usize,
    pub last_frame: Option<PresentationState>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for HeadlessHost {
    fn open_external(&mut self, url: &str) {
        debug!("open {url}");
        self.opened.push(url.to_string());
    }

    fn schedule(&mut self, timer: ScheduledTimer, delay_ms: u64) {
        self.clock.schedule(timer, delay_ms);
    }

    fn cancel(&mut self, timer: ScheduledTimer) {
        self.clock.cancel(timer);
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.cursor = cursor;
    }

    fn set_audio_playing(&mut self, playing: bool) {
        self.audio_playing = playing;
    }

    fn render(&mut self, state: &PresentationState) {
        self.frames += 1;
        self.last_frame = Some(state.clone());
    }
}

impl Session<HeadlessHost> {
    /// Moves the simulated clock forward, firing every timer that falls due
    /// on the way, including ones scheduled by earlier timers.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.host().clock.now_ms().saturating_add(ms);
        while let Some(timer) = self.host_mut().clock.pop_due(deadline) {
            self.timer_fired(timer);
        }
        self.host_mut().clock.set_now(deadline);
    }

    pub fn now_ms(&self) -> u64 {
        self.host().clock.now_ms()
    }
}

pub fn print_targets(registry: &TargetRegistry) {
    println!("Registered {} target(s):", registry.len());
    for target in registry.targets() {
        let category = target
            .category
            .map(|category| category.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(" - {} [{}] -> {}", target.name, target.id, category);
    }
}

pub fn print_final_state<H: Host>(session: &Session<H>) {
    let state = session.presentation();
    println!("Final state: {}", session.state());
    println!("Progress: {}", state.progress_text());
    if let Some(content) = state.modal_content() {
        println!("Modal: {}", content.title);
    }
    if let Some(toast) = &state.toast {
        println!("Toast: {toast}");
    }
    if let Some(cue) = state.completion_cue_text() {
        println!("Completion cue: {cue}");
    }
    if state.celebration {
        println!("Overlay: {THANK_YOU_TEXT}");
    }
    println!(
        "Controls: muted={} intro={} cursor={}",
        state.controls.muted,
        state.controls.intro_visible,
        state.controls.cursor.as_css()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::category::TOTAL_CATEGORY_COUNT;
    use crate::presentation::HALFWAY_MESSAGE;
    use crate::scene::{NodeId, Scene, SceneNode};
    use crate::script::parse_script;
    use crate::tracker::SessionState;

    fn session() -> Session<HeadlessHost> {
        let scene = Scene {
            nodes: vec![
                SceneNode::new(NodeId::from("text"), "Text_target"),
                SceneNode::new(NodeId::from("pc"), "pc_target"),
            ],
        };
        Session::new(&scene, SessionConfig::default(), HeadlessHost::new())
    }

    #[test]
    fn advance_fires_due_timers() {
        let mut session = session();
        session.on_click("Text_target");
        session.on_click("pc_target");
        session.close_modal();
        assert_eq!(session.state(), SessionState::Browsing);
        assert_eq!(session.host().opened, vec!["https://github.com/oCHRONOSo"]);

        session.advance(100);
        assert_eq!(session.now_ms(), 100);
        assert_eq!(session.host().clock.pending(), 0);
    }

    #[test]
    fn waits_past_the_end_of_time_saturate() {
        let mut session = session();
        let commands = parse_script("wait 18446744073709551615\nwait 1\n").unwrap();
        for command in &commands {
            command.apply(&mut session);
        }
        assert_eq!(session.now_ms(), u64::MAX);
    }

    #[test]
    fn render_keeps_the_latest_snapshot() {
        let scene = Scene {
            nodes: vec![
                SceneNode::new(NodeId::from("pc"), "pc_target"),
                SceneNode::new(NodeId::from("guitar"), "guitar_target"),
                SceneNode::new(NodeId::from("pot"), "pot_target"),
            ],
        };
        let mut session = Session::new(&scene, SessionConfig::default(), HeadlessHost::new());
        let initial = session.host().last_frame.clone().unwrap();
        assert_eq!(initial.found, 0);
        assert!(initial.controls.intro_visible);

        for name in ["pc_target", "guitar_target", "pot_target"] {
            session.on_click(name);
            session.close_modal();
        }
        let frame = session.host().last_frame.as_ref().unwrap();
        assert_eq!(frame, session.presentation());
        assert_eq!(frame.found, 3);
        assert_eq!(frame.total, TOTAL_CATEGORY_COUNT);
        assert_eq!(frame.toast.as_deref(), Some(HALFWAY_MESSAGE));
        assert_eq!(frame.modal, None);

        session.advance(2500);
        assert_eq!(session.host().last_frame.as_ref().unwrap().toast, None);
    }

    #[test]
    fn mute_toggle_drives_audio() {
        let mut session = session();
        assert!(!session.host().audio_playing);
        assert!(session.toggle_mute());
        assert!(session.host().audio_playing);
        assert!(!session.toggle_mute());
        assert!(!session.host().audio_playing);
    }
}
