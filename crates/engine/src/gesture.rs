//! Swipe gesture state machine.
//!
//! ```text
//! Idle -> Dragging -> Committing(dir) -> Idle   (commit fires on AnimationComplete)
//!                  -> SnappingBack    -> Idle   (no commit)
//! Idle | Dragging  -> Committing(dir)           (programmatic trigger)
//! ```
//!
//! `transition` is pure; `GestureMachine` owns the state between events and
//! stops accepting events once torn down. Positions stored while Committing or
//! SnappingBack are animation targets; the host interpolates towards them.

use crate::config::GestureConfig;
use records::SwipeDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    Committing(SwipeDirection),
    SnappingBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    pub phase: GesturePhase,
    pub dx: f32,
    pub dy: f32,
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        self.phase == GesturePhase::Idle
    }

    /// Cosmetic tilt in degrees, clamped to `±max_rotation_degrees`.
    pub fn rotation(&self, config: &GestureConfig) -> f32 {
        let max = config.max_rotation_degrees;
        (self.dx / (config.screen_width / 2.0) * max).clamp(-max, max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    DragStart,
    /// Translation relative to where the drag started.
    DragMove { dx: f32, dy: f32 },
    Release,
    /// Commit without dragging, e.g. a like/pass button.
    Trigger(SwipeDirection),
    AnimationComplete,
}

/// Result of feeding one event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Moved,
    /// Exit animation started; the decision fires when it completes.
    Committing(SwipeDirection),
    SnappingBack,
    /// Exit animation finished: commit the active card now, exactly once.
    Commit(SwipeDirection),
    /// Snap-back finished without a decision.
    Settled,
    Ignored,
}

/// Where the active card is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GesturePosition {
    pub dx: f32,
    pub dy: f32,
    pub rotation: f32,
}

/// Compute the next state for `event`.
///
/// `has_card` is whether the deck has an active card; gestures never start
/// without one.
pub fn transition(
    state: &GestureState,
    event: GestureEvent,
    config: &GestureConfig,
    has_card: bool,
) -> (GestureState, Transition) {
    let ignored = (*state, Transition::Ignored);

    match (state.phase, event) {
        (GesturePhase::Idle, GestureEvent::DragStart) if has_card => (
            GestureState {
                phase: GesturePhase::Dragging,
                dx: 0.0,
                dy: 0.0,
            },
            Transition::Started,
        ),
        (GesturePhase::Dragging, GestureEvent::DragMove { dx, dy }) if dx.is_finite() && dy.is_finite() => (
            GestureState {
                phase: GesturePhase::Dragging,
                dx,
                dy,
            },
            Transition::Moved,
        ),
        (GesturePhase::Dragging, GestureEvent::Release) => {
            if state.dx.abs() >= config.threshold_px() {
                let direction = SwipeDirection::from_translation(state.dx);
                (exit_state(state, direction, config), Transition::Committing(direction))
            } else {
                (
                    GestureState {
                        phase: GesturePhase::SnappingBack,
                        dx: 0.0,
                        dy: 0.0,
                    },
                    Transition::SnappingBack,
                )
            }
        }
        (GesturePhase::Idle | GesturePhase::Dragging, GestureEvent::Trigger(direction)) if has_card => {
            (exit_state(state, direction, config), Transition::Committing(direction))
        }
        (GesturePhase::Committing(direction), GestureEvent::AnimationComplete) => {
            (GestureState::default(), Transition::Commit(direction))
        }
        (GesturePhase::SnappingBack, GestureEvent::AnimationComplete) => {
            (GestureState::default(), Transition::Settled)
        }
        _ => ignored,
    }
}

fn exit_state(state: &GestureState, direction: SwipeDirection, config: &GestureConfig) -> GestureState {
    GestureState {
        phase: GesturePhase::Committing(direction),
        dx: direction.sign() * config.screen_width * 1.5,
        dy: state.dy,
    }
}

/// Stateful wrapper around [`transition`] for one deck.
#[derive(Debug, Clone)]
pub struct GestureMachine {
    state: GestureState,
    config: GestureConfig,
    torn_down: bool,
}

impl GestureMachine {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            state: GestureState::default(),
            config,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn phase(&self) -> GesturePhase {
        self.state.phase
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn position(&self) -> GesturePosition {
        GesturePosition {
            dx: self.state.dx,
            dy: self.state.dy,
            rotation: self.state.rotation(&self.config),
        }
    }

    pub fn handle(&mut self, event: GestureEvent, has_card: bool) -> Transition {
        if self.torn_down {
            tracing::debug!("Ignoring {:?} after teardown", event);
            return Transition::Ignored;
        }
        let (next, outcome) = transition(&self.state, event, &self.config, has_card);
        if outcome == Transition::Ignored {
            tracing::debug!("Ignoring {:?} in phase {:?}", event, self.state.phase);
        }
        self.state = next;
        outcome
    }

    /// Stop accepting events.
    ///
    /// Returns the direction of a commit whose exit animation was already
    /// running: that decision is still owed to the committer.
    pub fn teardown(&mut self) -> Option<SwipeDirection> {
        if self.torn_down {
            return None;
        }
        self.torn_down = true;
        let pending = match self.state.phase {
            GesturePhase::Committing(direction) => Some(direction),
            _ => None,
        };
        self.state = GestureState::default();
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GestureConfig {
        GestureConfig::default()
    }

    fn dragged(dx: f32) -> GestureState {
        GestureState {
            phase: GesturePhase::Dragging,
            dx,
            dy: 4.0,
        }
    }

    #[test]
    fn test_drag_start_requires_card() {
        let idle = GestureState::default();
        let (_, outcome) = transition(&idle, GestureEvent::DragStart, &config(), false);
        assert_eq!(outcome, Transition::Ignored);

        let (next, outcome) = transition(&idle, GestureEvent::DragStart, &config(), true);
        assert_eq!(outcome, Transition::Started);
        assert_eq!(next.phase, GesturePhase::Dragging);
    }

    #[test]
    fn test_release_threshold() {
        // default threshold: 0.25 * 390 = 97.5px
        let (next, outcome) = transition(&dragged(97.5), GestureEvent::Release, &config(), true);
        assert_eq!(outcome, Transition::Committing(SwipeDirection::Right));
        assert_eq!(next.phase, GesturePhase::Committing(SwipeDirection::Right));

        let (_, outcome) = transition(&dragged(-120.0), GestureEvent::Release, &config(), true);
        assert_eq!(outcome, Transition::Committing(SwipeDirection::Left));

        let (next, outcome) = transition(&dragged(97.4), GestureEvent::Release, &config(), true);
        assert_eq!(outcome, Transition::SnappingBack);
        assert_eq!(next.phase, GesturePhase::SnappingBack);
        assert_eq!((next.dx, next.dy), (0.0, 0.0));
    }

    #[test]
    fn test_non_finite_move_is_ignored() {
        let before = dragged(40.0);
        for (dx, dy) in [(f32::NAN, 0.0), (f32::INFINITY, 0.0), (10.0, f32::NEG_INFINITY)] {
            let (next, outcome) = transition(&before, GestureEvent::DragMove { dx, dy }, &config(), true);
            assert_eq!(outcome, Transition::Ignored);
            assert_eq!(next, before);
            assert!(next.rotation(&config()).is_finite());
        }
    }

    #[test]
    fn test_rotation_is_clamped() {
        let config = config();
        assert_eq!(dragged(0.0).rotation(&config), 0.0);
        assert_eq!(dragged(97.5).rotation(&config), 5.0);
        assert_eq!(dragged(195.0).rotation(&config), 10.0);
        assert_eq!(dragged(1000.0).rotation(&config), 10.0);
        assert_eq!(dragged(-1000.0).rotation(&config), -10.0);
    }

    #[test]
    fn test_trigger_ignored_while_animating() {
        let committing = GestureState {
            phase: GesturePhase::Committing(SwipeDirection::Left),
            dx: -585.0,
            dy: 0.0,
        };
        let trigger = GestureEvent::Trigger(SwipeDirection::Right);
        let (next, outcome) = transition(&committing, trigger, &config(), true);
        assert_eq!(outcome, Transition::Ignored);
        assert_eq!(next, committing);

        let snapping = GestureState {
            phase: GesturePhase::SnappingBack,
            ..GestureState::default()
        };
        let (_, outcome) = transition(&snapping, trigger, &config(), true);
        assert_eq!(outcome, Transition::Ignored);
    }

    #[test]
    fn test_trigger_from_drag_or_idle() {
        let trigger = GestureEvent::Trigger(SwipeDirection::Left);
        let (_, outcome) = transition(&dragged(10.0), trigger, &config(), true);
        assert_eq!(outcome, Transition::Committing(SwipeDirection::Left));

        let (_, outcome) = transition(&GestureState::default(), trigger, &config(), false);
        assert_eq!(outcome, Transition::Ignored);
    }

    #[test]
    fn test_machine_full_cycle() {
        let mut machine = GestureMachine::new(config());
        assert_eq!(machine.handle(GestureEvent::DragStart, true), Transition::Started);
        assert_eq!(
            machine.handle(GestureEvent::DragMove { dx: 150.0, dy: 0.0 }, true),
            Transition::Moved
        );
        assert!(machine.position().rotation > 0.0);
        assert_eq!(
            machine.handle(GestureEvent::Release, true),
            Transition::Committing(SwipeDirection::Right)
        );
        assert_eq!(
            machine.handle(GestureEvent::AnimationComplete, true),
            Transition::Commit(SwipeDirection::Right)
        );
        assert!(machine.is_idle());
        // A stray completion event does not commit twice
        assert_eq!(machine.handle(GestureEvent::AnimationComplete, true), Transition::Ignored);
    }

    #[test]
    fn test_teardown_reports_pending_commit() {
        let mut machine = GestureMachine::new(config());
        machine.handle(GestureEvent::Trigger(SwipeDirection::Right), true);

        assert_eq!(machine.teardown(), Some(SwipeDirection::Right));
        assert!(machine.is_torn_down());
        assert_eq!(machine.handle(GestureEvent::DragStart, true), Transition::Ignored);
        assert_eq!(machine.teardown(), None);
    }
}
