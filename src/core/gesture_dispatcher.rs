// Gesture-to-action dispatch
//
// Turns per-frame gesture labels into discrete mouse actions. All state that
// survives between frames lives in `GestureState`, which is passed in and
// returned by value so the dispatcher can be driven without a camera.

use crate::models::input::MouseAction;
use crate::models::pose::{ActiveGesture, GestureLabels};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CLICK_COOLDOWN: Duration = Duration::from_millis(500);
pub const DEFAULT_SCROLL_SCALE: f32 = 500.0;
pub const DEFAULT_SCROLL_DEADZONE: i32 = 10;

/// Tunables for the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Minimum time between two clicks of the same button
    pub click_cooldown: Duration,
    /// Multiplier from normalized vertical movement to scroll units
    pub scroll_scale: f32,
    /// Scroll deltas with magnitude at or below this are ignored
    pub scroll_deadzone: i32,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            click_cooldown: DEFAULT_CLICK_COOLDOWN,
            scroll_scale: DEFAULT_SCROLL_SCALE,
            scroll_deadzone: DEFAULT_SCROLL_DEADZONE,
        }
    }
}

/// State carried from one frame to the next
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    /// Time of the last emitted left click, relative to the start of the run
    pub last_click: Option<Duration>,
    pub last_right_click: Option<Duration>,
    /// Smoothed cursor position produced for the previous frame
    pub previous_cursor: Option<(f64, f64)>,
    /// Vertical position of the tracked point on the previous open-hand frame
    pub scroll_anchor: Option<f32>,
}

impl GestureState {
    /// Forget the scroll anchor so re-entering the open-hand pose starts fresh
    pub fn without_scroll_anchor(self) -> Self {
        Self {
            scroll_anchor: None,
            ..self
        }
    }
}

/// What the dispatcher sees for a frame with a detected hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGesture {
    pub labels: GestureLabels,
    /// Normalized y of the tracked landmark (index finger tip)
    pub tracked_y: f32,
}

fn cooldown_elapsed(last: Option<Duration>, now: Duration, cooldown: Duration) -> bool {
    match last {
        Some(last) => now.saturating_sub(last) > cooldown,
        None => true,
    }
}

/// Decide the gesture action for one frame.
///
/// Priority is pinch, then peace sign, then open-hand scroll. Any frame that is
/// not an open-hand frame, including one with no hand at all, clears the
/// scroll anchor.
pub fn dispatch(
    gesture: Option<&FrameGesture>,
    now: Duration,
    state: GestureState,
    settings: &DispatchSettings,
) -> (Vec<MouseAction>, GestureState) {
    let mut actions = Vec::new();

    let gesture = match gesture {
        Some(gesture) => gesture,
        None => return (actions, state.without_scroll_anchor()),
    };

    let next = match gesture.labels.active_gesture() {
        ActiveGesture::Pinch => {
            let state = state.without_scroll_anchor();
            if cooldown_elapsed(state.last_click, now, settings.click_cooldown) {
                actions.push(MouseAction::LeftClick);
                GestureState {
                    last_click: Some(now),
                    ..state
                }
            } else {
                state
            }
        }
        ActiveGesture::Peace => {
            let state = state.without_scroll_anchor();
            if cooldown_elapsed(state.last_right_click, now, settings.click_cooldown) {
                actions.push(MouseAction::RightClick);
                GestureState {
                    last_right_click: Some(now),
                    ..state
                }
            } else {
                state
            }
        }
        ActiveGesture::Scroll => {
            if let Some(anchor) = state.scroll_anchor {
                let delta = ((gesture.tracked_y - anchor) * settings.scroll_scale) as i32;
                if delta.abs() > settings.scroll_deadzone {
                    actions.push(MouseAction::Scroll { amount: -delta });
                }
            }
            GestureState {
                scroll_anchor: Some(gesture.tracked_y),
                ..state
            }
        }
        ActiveGesture::None => state.without_scroll_anchor(),
    };

    (actions, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pinching: bool, peace_sign: bool, extended_fingers: u8) -> GestureLabels {
        GestureLabels {
            pinching,
            peace_sign,
            extended_fingers,
        }
    }

    fn pinch() -> FrameGesture {
        FrameGesture {
            labels: labels(true, false, 1),
            tracked_y: 0.5,
        }
    }

    fn peace() -> FrameGesture {
        FrameGesture {
            labels: labels(false, true, 2),
            tracked_y: 0.5,
        }
    }

    fn open_hand(y: f32) -> FrameGesture {
        FrameGesture {
            labels: labels(false, false, 5),
            tracked_y: y,
        }
    }

    fn fist() -> FrameGesture {
        FrameGesture {
            labels: labels(false, false, 0),
            tracked_y: 0.5,
        }
    }

    fn run(frames: &[(u64, Option<FrameGesture>)]) -> Vec<(u64, MouseAction)> {
        let settings = DispatchSettings::default();
        let mut state = GestureState::default();
        let mut emitted = Vec::new();

        for (ms, gesture) in frames {
            let (actions, next) = dispatch(gesture.as_ref(), Duration::from_millis(*ms), state, &settings);
            emitted.extend(actions.into_iter().map(|a| (*ms, a)));
            state = next;
        }

        emitted
    }

    fn sustained(gesture: FrameGesture, until_ms: u64) -> Vec<(u64, Option<FrameGesture>)> {
        (0..=until_ms)
            .step_by(33)
            .map(|ms| (ms, Some(gesture)))
            .collect()
    }

    #[test]
    fn test_sustained_pinch_within_cooldown_clicks_once() {
        let emitted = run(&sustained(pinch(), 495));
        assert_eq!(emitted, vec![(0, MouseAction::LeftClick)]);
    }

    #[test]
    fn test_sustained_pinch_over_two_windows_clicks_twice() {
        // Frames at 0, 33, ..., 1023 ms: the second click lands on the first
        // frame more than 500 ms after the first, and the next would be at 1056 ms.
        let emitted = run(&sustained(pinch(), 1023));
        assert_eq!(
            emitted,
            vec![(0, MouseAction::LeftClick), (528, MouseAction::LeftClick)]
        );
    }

    #[test]
    fn test_cooldown_requires_strictly_more_than_window() {
        let emitted = run(&[(0, Some(pinch())), (500, Some(pinch())), (501, Some(pinch()))]);
        assert_eq!(
            emitted,
            vec![(0, MouseAction::LeftClick), (501, MouseAction::LeftClick)]
        );
    }

    #[test]
    fn test_pinch_takes_priority_even_during_cooldown() {
        let both = FrameGesture {
            labels: labels(true, true, 2),
            tracked_y: 0.5,
        };
        let emitted = run(&[(0, Some(both)), (100, Some(both))]);
        assert_eq!(emitted, vec![(0, MouseAction::LeftClick)]);
    }

    #[test]
    fn test_right_click_has_its_own_cooldown() {
        let emitted = run(&[
            (0, Some(pinch())),
            (33, Some(peace())),
            (66, Some(peace())),
            (600, Some(peace())),
        ]);
        assert_eq!(
            emitted,
            vec![
                (0, MouseAction::LeftClick),
                (33, MouseAction::RightClick),
                (600, MouseAction::RightClick),
            ]
        );
    }

    #[test]
    fn test_scroll_follows_vertical_movement() {
        let emitted = run(&[
            (0, Some(open_hand(0.50))),
            (33, Some(open_hand(0.55))),
            (66, Some(open_hand(0.45))),
        ]);
        // Moving down by 0.05 is a delta of 25, scrolled in the opposite direction
        assert_eq!(
            emitted,
            vec![
                (33, MouseAction::Scroll { amount: -25 }),
                (66, MouseAction::Scroll { amount: 50 }),
            ]
        );
    }

    #[test]
    fn test_scroll_deadzone() {
        // A delta of about 10 does not clear the dead zone
        let emitted = run(&[(0, Some(open_hand(0.50))), (33, Some(open_hand(0.52)))]);
        assert!(emitted.is_empty());
    }

    #[test]
    fn test_scroll_anchor_resets_after_non_actionable_frame() {
        let emitted = run(&[
            (0, Some(open_hand(0.20))),
            (33, Some(fist())),
            (66, Some(open_hand(0.80))),
        ]);
        assert!(emitted.is_empty());

        let settings = DispatchSettings::default();
        let (_, state) = dispatch(Some(&open_hand(0.2)), Duration::ZERO, GestureState::default(), &settings);
        let (_, state) = dispatch(Some(&fist()), Duration::from_millis(33), state, &settings);
        assert_eq!(state.scroll_anchor, None);
        let (actions, state) = dispatch(Some(&open_hand(0.8)), Duration::from_millis(66), state, &settings);
        assert!(actions.is_empty());
        assert_eq!(state.scroll_anchor, Some(0.8));
    }

    #[test]
    fn test_missing_hand_clears_anchor_and_emits_nothing() {
        let settings = DispatchSettings::default();
        let state = GestureState {
            last_click: Some(Duration::from_millis(10)),
            scroll_anchor: Some(0.4),
            ..Default::default()
        };

        let (actions, next) = dispatch(None, Duration::from_millis(20), state, &settings);
        assert!(actions.is_empty());
        assert_eq!(next.scroll_anchor, None);
        assert_eq!(next.last_click, Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_click_gestures_also_clear_scroll_anchor() {
        let emitted = run(&[
            (0, Some(open_hand(0.20))),
            (33, Some(pinch())),
            (66, Some(open_hand(0.40))),
            (99, Some(peace())),
            (132, Some(open_hand(0.90))),
        ]);
        assert_eq!(
            emitted,
            vec![(33, MouseAction::LeftClick), (99, MouseAction::RightClick)]
        );
    }
}
