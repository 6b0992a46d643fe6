//! Discovery state machine.
//!
//! Every input is an [`Event`] handed to [`DiscoveryTracker::handle`], which
//! updates the state synchronously and returns the [`Effect`]s the host has
//! to carry out: presentation updates, external navigation, and timers to
//! schedule or cancel.
//!
//! ```text
//! Browsing     --click(link)------------> Browsing (+discovery, no modal)
//! Browsing     --click(modal category)--> ModalOpen(c)
//! ModalOpen(c) --close, not complete----> Browsing
//! ModalOpen(c) --close, complete--------> CompletionPending
//! Browsing     --last discovery---------> CompletionPending
//! CompletionPending --cue timer---------> Celebrating
//! Celebrating  --restart----------------> Browsing (discoveries cleared)
//! ```

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::category::{TargetCategory, TOTAL_CATEGORY_COUNT};
use crate::config::SessionConfig;
use crate::error::TransitionError;
use crate::presentation::{Signal, ALMOST_MESSAGE, HALFWAY_MESSAGE};
use crate::timer::{ScheduledTimer, TimerKind, TimerSlots};

/// Discovery counts that raise a progress toast.
const MILESTONES: &[(usize, &str)] = &[(3, HALFWAY_MESSAGE), (6, ALMOST_MESSAGE)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Browsing,
    ModalOpen(TargetCategory),
    CompletionPending,
    Celebrating,
}

impl SessionState {
    fn is_finished(self) -> bool {
        matches!(self, Self::CompletionPending | Self::Celebrating)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browsing => f.write_str("browsing"),
            Self::ModalOpen(category) => write!(f, "modal open ({category})"),
            Self::CompletionPending => f.write_str("completion pending"),
            Self::Celebrating => f.write_str("celebrating"),
        }
    }
}

/// Categories found so far, unique by category rather than by node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySet(BTreeSet<TargetCategory>);

impl DiscoverySet {
    /// Returns `true` if the category was not discovered before.
    pub fn insert(&mut self, category: TargetCategory) -> bool {
        self.0.insert(category)
    }

    pub fn contains(&self, category: TargetCategory) -> bool {
        self.0.contains(&category)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == TOTAL_CATEGORY_COUNT
    }

    pub fn iter(&self) -> impl Iterator<Item = TargetCategory> + '_ {
        self.0.iter().copied()
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    TargetClicked(TargetCategory),
    ModalClosed,
    TimerFired(ScheduledTimer),
    Restart,
}

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Present(Signal),
    OpenExternal(String),
    Schedule {
        timer: ScheduledTimer,
        delay_ms: u64,
    },
    Cancel(ScheduledTimer),
}

#[derive(Debug, Clone)]
pub struct DiscoveryTracker {
    discovered: DiscoverySet,
    state: SessionState,
    timers: TimerSlots,
    toast_duration_ms: u64,
    completion_cue_delay_ms: u64,
    external_link_url: String,
}

impl DiscoveryTracker {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            discovered: DiscoverySet::default(),
            state: SessionState::Browsing,
            timers: TimerSlots::new(),
            toast_duration_ms: config.toast_duration_ms,
            completion_cue_delay_ms: config.completion_cue_delay_ms,
            external_link_url: config.external_link_url.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn discovered(&self) -> &DiscoverySet {
        &self.discovered
    }

    pub fn found(&self) -> usize {
        self.discovered.len()
    }

    pub fn handle(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        match event {
            Event::TargetClicked(category) => self.on_target_clicked(category),
            Event::ModalClosed => self.on_modal_closed(),
            Event::TimerFired(timer) => self.on_timer_fired(timer),
            Event::Restart => self.restart(),
        }
    }

    pub fn on_target_clicked(
        &mut self,
        category: TargetCategory,
    ) -> Result<Vec<Effect>, TransitionError> {
        if self.state.is_finished() {
            return Err(TransitionError::DiscoveryClosed(self.state));
        }

        let mut effects = Vec::new();
        if category.is_external() {
            effects.push(Effect::OpenExternal(self.external_link_url.clone()));
        } else {
            self.state = SessionState::ModalOpen(category);
            effects.push(Effect::Present(Signal::SetModal(Some(category))));
        }

        if self.discovered.insert(category) {
            let found = self.discovered.len();
            info!("discovered {category} ({found}/{TOTAL_CATEGORY_COUNT})");
            effects.push(Effect::Present(Signal::SetProgress {
                found,
                total: TOTAL_CATEGORY_COUNT,
            }));
            if let Some((_, message)) = MILESTONES.iter().find(|(at, _)| *at == found) {
                self.show_toast(message, &mut effects);
            }
        } else {
            debug!("{category} was already discovered");
        }

        if self.discovered.is_complete() && self.state == SessionState::Browsing {
            self.enter_completion_pending(&mut effects);
        }
        Ok(effects)
    }

    pub fn on_modal_closed(&mut self) -> Result<Vec<Effect>, TransitionError> {
        let SessionState::ModalOpen(_) = self.state else {
            return Err(TransitionError::NoModalOpen(self.state));
        };

        let mut effects = vec![Effect::Present(Signal::SetModal(None))];
        self.state = SessionState::Browsing;
        if self.discovered.is_complete() {
            self.enter_completion_pending(&mut effects);
        }
        Ok(effects)
    }

    fn on_timer_fired(&mut self, timer: ScheduledTimer) -> Result<Vec<Effect>, TransitionError> {
        if !self.timers.fire(timer) {
            return Err(TransitionError::StaleTimer(timer));
        }

        let mut effects = Vec::new();
        match timer.kind {
            TimerKind::Toast => effects.push(Effect::Present(Signal::ClearNotification)),
            TimerKind::CompletionCue => {
                if self.state == SessionState::CompletionPending {
                    info!("all targets found, celebrating");
                    self.state = SessionState::Celebrating;
                    effects.push(Effect::Present(Signal::SetCompletionCue(false)));
                    effects.push(Effect::Present(Signal::SetCelebration(true)));
                }
            }
        }
        Ok(effects)
    }

    /// The user-facing restart command, accepted only while celebrating.
    pub fn restart(&mut self) -> Result<Vec<Effect>, TransitionError> {
        if self.state != SessionState::Celebrating {
            return Err(TransitionError::NotCelebrating(self.state));
        }
        info!("restarting discovery");
        Ok(self.reset())
    }

    /// Returns to the initial state from any state, cancelling every pending
    /// timer.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = self.timers.drain().into_iter().map(Effect::Cancel).collect();
        self.discovered.clear();
        self.state = SessionState::Browsing;
        effects.extend(
            [
                Signal::SetModal(None),
                Signal::ClearNotification,
                Signal::SetCompletionCue(false),
                Signal::SetCelebration(false),
                Signal::SetProgress {
                    found: 0,
                    total: TOTAL_CATEGORY_COUNT,
                },
            ]
            .into_iter()
            .map(Effect::Present),
        );
        effects
    }

    fn show_toast(&mut self, message: &str, effects: &mut Vec<Effect>) {
        info!("milestone: {message}");
        let (timer, replaced) = self.timers.arm(TimerKind::Toast);
        if let Some(replaced) = replaced {
            effects.push(Effect::Cancel(replaced));
        }
        effects.push(Effect::Present(Signal::Notify {
            message: message.to_string(),
            duration_ms: self.toast_duration_ms,
        }));
        effects.push(Effect::Schedule {
            timer,
            delay_ms: self.toast_duration_ms,
        });
    }

    fn enter_completion_pending(&mut self, effects: &mut Vec<Effect>) {
        if self.state.is_finished() || self.timers.is_armed(TimerKind::CompletionCue) {
            return;
        }
        info!("all {TOTAL_CATEGORY_COUNT} targets found");
        self.state = SessionState::CompletionPending;
        let (timer, _) = self.timers.arm(TimerKind::CompletionCue);
        effects.push(Effect::Present(Signal::SetCompletionCue(true)));
        effects.push(Effect::Schedule {
            timer,
            delay_ms: self.completion_cue_delay_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TargetCategory::*;

    fn tracker() -> DiscoveryTracker {
        DiscoveryTracker::new(&SessionConfig::default())
    }

    fn scheduled(effects: &[Effect], kind: TimerKind) -> Option<ScheduledTimer> {
        effects.iter().find_map(|effect| match effect {
            Effect::Schedule { timer, .. } if timer.kind == kind => Some(*timer),
            _ => None,
        })
    }

    fn toasts(effects: &[Effect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Present(Signal::Notify { message, .. }) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn click_and_close(tracker: &mut DiscoveryTracker, category: TargetCategory) -> Vec<Effect> {
        let mut effects = tracker.on_target_clicked(category).unwrap();
        if let SessionState::ModalOpen(_) = tracker.state() {
            effects.extend(tracker.on_modal_closed().unwrap());
        }
        effects
    }

    #[test]
    fn modal_category_opens_modal_and_counts() {
        let mut tracker = tracker();
        let effects = tracker.on_target_clicked(TechStack).unwrap();
        assert_eq!(tracker.state(), SessionState::ModalOpen(TechStack));
        assert!(effects.contains(&Effect::Present(Signal::SetModal(Some(TechStack)))));
        assert!(effects.contains(&Effect::Present(Signal::SetProgress { found: 1, total: 7 })));
    }

    #[test]
    fn link_navigates_without_modal() {
        let mut tracker = tracker();
        let effects = tracker.on_target_clicked(Link).unwrap();
        assert_eq!(tracker.state(), SessionState::Browsing);
        assert_eq!(
            effects[0],
            Effect::OpenExternal("https://github.com/oCHRONOSo".into())
        );
        assert!(tracker.discovered().contains(Link));
    }

    #[test]
    fn reclick_reopens_modal_without_counting() {
        let mut tracker = tracker();
        click_and_close(&mut tracker, Lantern);
        let effects = tracker.on_target_clicked(Lantern).unwrap();
        assert_eq!(tracker.state(), SessionState::ModalOpen(Lantern));
        assert_eq!(tracker.found(), 1);
        assert_eq!(effects, vec![Effect::Present(Signal::SetModal(Some(Lantern)))]);
    }

    #[test]
    fn halfway_toast_after_third_discovery() {
        let mut tracker = tracker();
        click_and_close(&mut tracker, Sculpture);
        click_and_close(&mut tracker, Literature);
        let effects = tracker.on_target_clicked(TechStack).unwrap();
        assert_eq!(toasts(&effects), vec![HALFWAY_MESSAGE.to_string()]);
        assert!(effects.contains(&Effect::Present(Signal::SetProgress { found: 3, total: 7 })));
        let timer = scheduled(&effects, TimerKind::Toast).unwrap();

        let effects = tracker.handle(Event::TimerFired(timer)).unwrap();
        assert_eq!(effects, vec![Effect::Present(Signal::ClearNotification)]);
    }

    #[test]
    fn newer_toast_cancels_older_timer() {
        let config = SessionConfig {
            toast_duration_ms: 60_000,
            ..SessionConfig::default()
        };
        let mut tracker = DiscoveryTracker::new(&config);
        let mut halfway = None;
        for category in [Sculpture, Literature, TechStack, Lantern, Seating] {
            let effects = click_and_close(&mut tracker, category);
            halfway = halfway.or(scheduled(&effects, TimerKind::Toast));
        }
        let halfway = halfway.unwrap();
        let effects = tracker.on_target_clicked(Instrument).unwrap();
        assert!(effects.contains(&Effect::Cancel(halfway)));
        assert_eq!(toasts(&effects), vec![ALMOST_MESSAGE.to_string()]);
        assert_eq!(
            tracker.handle(Event::TimerFired(halfway)),
            Err(TransitionError::StaleTimer(halfway))
        );
    }

    #[test]
    fn completion_waits_for_modal_close() {
        let mut tracker = tracker();
        for category in [Link, TechStack, Instrument, Sculpture, Seating, Literature] {
            click_and_close(&mut tracker, category);
        }
        tracker.on_target_clicked(Lantern).unwrap();
        assert_eq!(tracker.state(), SessionState::ModalOpen(Lantern));

        let effects = tracker.on_modal_closed().unwrap();
        assert_eq!(tracker.state(), SessionState::CompletionPending);
        assert!(effects.contains(&Effect::Present(Signal::SetCompletionCue(true))));
        let cue = scheduled(&effects, TimerKind::CompletionCue).unwrap();

        let effects = tracker.handle(Event::TimerFired(cue)).unwrap();
        assert_eq!(tracker.state(), SessionState::Celebrating);
        assert!(effects.contains(&Effect::Present(Signal::SetCelebration(true))));
    }

    #[test]
    fn link_as_last_discovery_completes_immediately() {
        let mut tracker = tracker();
        for category in [TechStack, Instrument, Sculpture, Seating, Literature, Lantern] {
            click_and_close(&mut tracker, category);
        }
        let effects = tracker.on_target_clicked(Link).unwrap();
        assert_eq!(tracker.state(), SessionState::CompletionPending);
        assert!(scheduled(&effects, TimerKind::CompletionCue).is_some());
    }

    #[test]
    fn link_completing_under_open_modal_waits_for_close() {
        let mut tracker = tracker();
        for category in [TechStack, Instrument, Sculpture, Seating, Literature, Lantern] {
            click_and_close(&mut tracker, category);
        }
        tracker.on_target_clicked(Lantern).unwrap();
        assert_eq!(tracker.state(), SessionState::ModalOpen(Lantern));

        let effects = tracker.on_target_clicked(Link).unwrap();
        assert_eq!(tracker.state(), SessionState::ModalOpen(Lantern));
        assert_eq!(tracker.found(), 7);
        assert!(effects.contains(&Effect::OpenExternal("https://github.com/oCHRONOSo".into())));
        assert!(effects.contains(&Effect::Present(Signal::SetProgress { found: 7, total: 7 })));
        assert!(scheduled(&effects, TimerKind::CompletionCue).is_none());
        assert!(!effects.contains(&Effect::Present(Signal::SetCompletionCue(true))));

        let effects = tracker.on_modal_closed().unwrap();
        assert_eq!(tracker.state(), SessionState::CompletionPending);
        assert!(scheduled(&effects, TimerKind::CompletionCue).is_some());
    }

    #[test]
    fn clicks_after_completion_are_rejected() {
        let mut tracker = tracker();
        for category in TargetCategory::ALL {
            click_and_close(&mut tracker, category);
        }
        assert_eq!(
            tracker.on_target_clicked(TechStack),
            Err(TransitionError::DiscoveryClosed(
                SessionState::CompletionPending
            ))
        );
    }

    #[test]
    fn invalid_transitions_leave_state_alone() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.on_modal_closed(),
            Err(TransitionError::NoModalOpen(SessionState::Browsing))
        );
        tracker.on_target_clicked(Seating).unwrap();
        assert_eq!(
            tracker.restart(),
            Err(TransitionError::NotCelebrating(SessionState::ModalOpen(
                Seating
            )))
        );
        assert_eq!(tracker.state(), SessionState::ModalOpen(Seating));
        assert_eq!(tracker.found(), 1);
    }

    #[test]
    fn reset_restores_initial_state_and_cancels_timers() {
        let mut tracker = tracker();
        click_and_close(&mut tracker, Sculpture);
        click_and_close(&mut tracker, Literature);
        let effects = tracker.on_target_clicked(TechStack).unwrap();
        let toast = scheduled(&effects, TimerKind::Toast).unwrap();

        let effects = tracker.reset();
        assert!(effects.contains(&Effect::Cancel(toast)));
        assert!(effects.contains(&Effect::Present(Signal::ClearNotification)));
        assert!(tracker.discovered().is_empty());
        assert_eq!(tracker.state(), SessionState::Browsing);
    }

    #[test]
    fn restart_from_celebration() {
        let mut tracker = tracker();
        let mut cue = None;
        for category in TargetCategory::ALL {
            let effects = click_and_close(&mut tracker, category);
            cue = cue.or(scheduled(&effects, TimerKind::CompletionCue));
        }
        tracker.handle(Event::TimerFired(cue.unwrap())).unwrap();
        let effects = tracker.handle(Event::Restart).unwrap();
        assert!(effects.contains(&Effect::Present(Signal::SetCelebration(false))));
        assert_eq!(tracker.state(), SessionState::Browsing);
        assert_eq!(tracker.found(), 0);
    }
}
