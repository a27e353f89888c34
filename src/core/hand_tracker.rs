// Per-frame hand tracking pipeline
// Landmarks -> gesture labels -> cursor position -> mouse actions

use crate::core::cursor_mapper::CursorMapper;
use crate::core::gesture_classifier;
use crate::core::gesture_dispatcher::{self, DispatchSettings, FrameGesture, GestureState};
use crate::models::capture::Frame;
use crate::models::input::{MouseAction, Point};
use crate::models::pose::{GestureLabels, HandLandmark, HandPose};
use crate::platform::pose::HandLandmarker;
use std::time::Duration;

/// Nominal frame spacing used to build landmarker timestamps (30 fps)
pub const FRAME_INTERVAL_MS: f64 = 33.33;

/// Result of running one frame through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Detection ran and found nothing
    NoHand,
    Processed {
        pose: HandPose,
        labels: GestureLabels,
        cursor: Point,
        /// Move first, then at most one gesture action
        actions: Vec<MouseAction>,
    },
    /// The frame could not be processed; gesture state was left untouched
    Skipped { reason: String },
}

impl FrameOutcome {
    pub fn actions(&self) -> &[MouseAction] {
        match self {
            FrameOutcome::Processed { actions, .. } => actions,
            _ => &[],
        }
    }
}

pub struct HandTracker<L: HandLandmarker> {
    landmarker: L,
    mapper: CursorMapper,
    settings: DispatchSettings,
    pinch_threshold: f32,
    gestures_enabled: bool,
    state: GestureState,
    frame_count: u64,
}

impl<L: HandLandmarker> HandTracker<L> {
    pub fn new(
        landmarker: L,
        mapper: CursorMapper,
        settings: DispatchSettings,
        pinch_threshold: f32,
        gestures_enabled: bool,
    ) -> Self {
        Self {
            landmarker,
            mapper,
            settings,
            pinch_threshold,
            gestures_enabled,
            state: GestureState::default(),
            frame_count: 0,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn landmarker(&self) -> &L {
        &self.landmarker
    }

    /// Frames handed to the landmarker so far, including skipped ones
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run detection, classification, mapping and dispatch for one frame.
    ///
    /// `now` is the time since the start of the run and drives click cooldowns.
    pub fn process_frame(&mut self, frame: &Frame, now: Duration) -> FrameOutcome {
        // The landmarker requires strictly increasing timestamps, so every
        // attempt advances the counter even if it fails
        self.frame_count += 1;
        let timestamp_ms = (self.frame_count as f64 * FRAME_INTERVAL_MS) as i64;

        let pose = match self.landmarker.detect(frame, timestamp_ms) {
            Ok(Some(pose)) => pose,
            Ok(None) => {
                let (_, next) = gesture_dispatcher::dispatch(None, now, self.state, &self.settings);
                self.state = next;
                return FrameOutcome::NoHand;
            }
            Err(e) => {
                log::warn!("Skipping frame {}: {}", self.frame_count, e);
                return FrameOutcome::Skipped { reason: e.to_string() };
            }
        };

        let labels = gesture_classifier::classify(&pose, self.pinch_threshold);
        let tracked = pose.landmark(HandLandmark::IndexFingerTip);
        let (cursor, smoothed) = self.mapper.map(tracked, self.state.previous_cursor);

        let mut actions = vec![MouseAction::Move { target: cursor }];
        let mut next = self.state;

        if self.gestures_enabled {
            let gesture = FrameGesture {
                labels,
                tracked_y: tracked.y,
            };
            let (gesture_actions, dispatched) =
                gesture_dispatcher::dispatch(Some(&gesture), now, self.state, &self.settings);
            actions.extend(gesture_actions);
            next = dispatched;
        }

        next.previous_cursor = Some(smoothed);
        self.state = next;

        FrameOutcome::Processed {
            pose,
            labels,
            cursor,
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gesture_classifier::tests::{open_hand, peace_sign, pinch};
    use crate::models::input::ScreenSize;
    use crate::models::pose::{PoseError, PoseResult};
    use crate::platform::pose::ReplayLandmarker;
    use image::RgbImage;

    /// Replays scripted detections and records the timestamps it was given
    struct ScriptedLandmarker {
        script: Vec<PoseResult<Option<HandPose>>>,
        timestamps: Vec<i64>,
    }

    impl ScriptedLandmarker {
        fn new(mut script: Vec<PoseResult<Option<HandPose>>>) -> Self {
            script.reverse();
            Self {
                script,
                timestamps: Vec::new(),
            }
        }
    }

    impl HandLandmarker for ScriptedLandmarker {
        fn detect(&mut self, _frame: &Frame, timestamp_ms: i64) -> PoseResult<Option<HandPose>> {
            self.timestamps.push(timestamp_ms);
            self.script.pop().unwrap_or(Ok(None))
        }

        fn is_initialized(&self) -> bool {
            true
        }

        fn get_model_info(&self) -> String {
            "scripted".to_string()
        }
    }

    fn frame() -> Frame {
        Frame::new(RgbImage::new(4, 4))
    }

    fn tracker<L: HandLandmarker>(landmarker: L, smoothing: f64, gestures: bool) -> HandTracker<L> {
        HandTracker::new(
            landmarker,
            CursorMapper::new(ScreenSize::new(1920, 1080), smoothing),
            DispatchSettings::default(),
            gesture_classifier::DEFAULT_PINCH_THRESHOLD,
            gestures,
        )
    }

    #[test]
    fn test_three_frame_scenario() {
        let replay = ReplayLandmarker::from_frames(vec![None, Some(pinch()), Some(peace_sign())]);
        let mut tracker = tracker(replay, 0.0, true);

        let first = tracker.process_frame(&frame(), Duration::from_millis(0));
        assert_eq!(first, FrameOutcome::NoHand);
        assert!(first.actions().is_empty());

        let second = tracker.process_frame(&frame(), Duration::from_millis(33));
        let pinch_target = Point::new(
            (pinch().landmarks[8].x as f64 * 1920.0) as i32,
            (pinch().landmarks[8].y as f64 * 1080.0) as i32,
        );
        assert_eq!(
            second.actions(),
            &[MouseAction::Move { target: pinch_target }, MouseAction::LeftClick]
        );

        let third = tracker.process_frame(&frame(), Duration::from_millis(66));
        let actions = third.actions();
        assert_eq!(actions.len(), 2);
        assert!(actions[0].is_move());
        assert_eq!(actions[1], MouseAction::RightClick);

        assert_eq!(tracker.state().last_click, Some(Duration::from_millis(33)));
        assert_eq!(tracker.state().last_right_click, Some(Duration::from_millis(66)));
    }

    #[test]
    fn test_landmarker_timestamps_advance_per_frame() {
        let mut tracker = tracker(ScriptedLandmarker::new(Vec::new()), 0.0, true);
        for _ in 0..4 {
            tracker.process_frame(&frame(), Duration::ZERO);
        }
        assert_eq!(tracker.landmarker().timestamps, vec![33, 66, 99, 133]);
        assert_eq!(tracker.frame_count(), 4);
    }

    #[test]
    fn test_failed_detection_skips_without_touching_state() {
        let script = vec![
            Ok(Some(open_hand())),
            Err(PoseError::InferenceFailed("decoder hiccup".to_string())),
        ];
        let mut tracker = tracker(ScriptedLandmarker::new(script), 0.1, true);

        tracker.process_frame(&frame(), Duration::from_millis(0));
        let before = *tracker.state();
        assert!(before.scroll_anchor.is_some());

        let outcome = tracker.process_frame(&frame(), Duration::from_millis(33));
        match outcome {
            FrameOutcome::Skipped { reason } => assert!(reason.contains("decoder hiccup")),
            other => panic!("expected a skipped frame, got {:?}", other),
        }
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn test_no_hand_clears_anchor_but_keeps_cursor() {
        let replay = ReplayLandmarker::from_frames(vec![Some(open_hand()), None]);
        let mut tracker = tracker(replay, 0.1, true);

        tracker.process_frame(&frame(), Duration::from_millis(0));
        let cursor = tracker.state().previous_cursor;
        assert!(cursor.is_some());

        tracker.process_frame(&frame(), Duration::from_millis(33));
        assert_eq!(tracker.state().scroll_anchor, None);
        assert_eq!(tracker.state().previous_cursor, cursor);
    }

    #[test]
    fn test_gestures_disabled_only_moves() {
        let replay = ReplayLandmarker::from_frames(vec![Some(pinch()), Some(peace_sign())]);
        let mut tracker = tracker(replay, 0.0, false);

        for ms in [0, 600] {
            let outcome = tracker.process_frame(&frame(), Duration::from_millis(ms));
            assert_eq!(outcome.actions().len(), 1);
            assert!(outcome.actions()[0].is_move());
        }
        assert_eq!(tracker.state().last_click, None);
    }

    #[test]
    fn test_cursor_smoothing_carries_between_frames() {
        let mut far = open_hand();
        far.landmarks[8].x = 0.9;
        far.landmarks[8].y = 0.9;
        let replay = ReplayLandmarker::from_frames(vec![Some(open_hand()), Some(far)]);
        let mut tracker = tracker(replay, 0.1, true);

        let first = match tracker.process_frame(&frame(), Duration::ZERO) {
            FrameOutcome::Processed { cursor, .. } => cursor,
            other => panic!("unexpected {:?}", other),
        };
        let second = match tracker.process_frame(&frame(), Duration::from_millis(33)) {
            FrameOutcome::Processed { cursor, .. } => cursor,
            other => panic!("unexpected {:?}", other),
        };

        // Smoothed position lands between the previous point and the new raw point
        assert!(second.x > first.x && second.x < (0.9 * 1920.0) as i32);
        assert!(second.y > first.y && second.y < (0.9 * 1080.0) as i32);
    }
}
