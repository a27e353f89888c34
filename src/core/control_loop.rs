// Capture -> track -> inject loop
//
// The default loop is single threaded: drain, read, process, inject, repeat.
// The threaded variant moves capture onto its own thread and hands frames over
// through a single-slot watch channel, so the processing side always works on
// the most recent frame and stale ones are dropped. Gesture state never leaves
// the processing thread.

use crate::core::config::Config;
use crate::core::hand_tracker::{FrameOutcome, HandTracker};
use crate::models::capture::{CaptureError, Frame, FrameOverlay};
use crate::models::input::MouseAction;
use crate::platform::capture::{FrameSource, Preview};
use crate::platform::input::InputSink;
use crate::platform::pose::HandLandmarker;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

pub const QUIT_KEY: char = 'q';

// Back-off after a failed read on the capture thread
const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(10);

// Longest the processing thread sleeps between quit-key polls while no frame is waiting
const FRAME_WAIT: Duration = Duration::from_millis(5);

// ==============================================================================
// Options
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopOptions {
    pub drain_frames: u32,
    pub drain_before_read: bool,
    /// Drain after each read (standard profile on network streams)
    pub drain_after_read: bool,
    pub mirror: bool,
}

impl LoopOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            drain_frames: config.drain_frames,
            drain_before_read: config.drain_before_read,
            drain_after_read: !config.drain_before_read && config.camera.is_network_stream(),
            mirror: config.mirror,
        }
    }
}

// ==============================================================================
// Statistics
// ==============================================================================

#[derive(Debug, Clone)]
pub struct RunStats {
    pub started_at: DateTime<Utc>,
    pub frames_processed: u64,
    pub frames_with_hand: u64,
    pub frames_skipped: u64,
    pub clicks: u64,
    pub right_clicks: u64,
    pub scrolls: u64,
    pub failed_actions: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            frames_processed: 0,
            frames_with_hand: 0,
            frames_skipped: 0,
            clicks: 0,
            right_clicks: 0,
            scrolls: 0,
            failed_actions: 0,
        }
    }

    pub fn record(&mut self, outcome: &FrameOutcome) {
        match outcome {
            FrameOutcome::Skipped { .. } => {
                self.frames_skipped += 1;
                return;
            }
            FrameOutcome::NoHand => {}
            FrameOutcome::Processed { .. } => self.frames_with_hand += 1,
        }
        self.frames_processed += 1;

        for action in outcome.actions() {
            match action {
                MouseAction::LeftClick => self.clicks += 1,
                MouseAction::RightClick => self.right_clicks += 1,
                MouseAction::Scroll { .. } => self.scrolls += 1,
                MouseAction::Move { .. } => {}
            }
        }
    }

    /// Average processed frames per second since the run started
    pub fn fps(&self) -> f64 {
        let elapsed_ms = (Utc::now() - self.started_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0.0;
        }
        self.frames_processed as f64 * 1000.0 / elapsed_ms as f64
    }

    pub fn summary(&self) -> String {
        let elapsed = Utc::now() - self.started_at;
        format!(
            "{} frames in {}s ({:.1} fps), hand in {}, skipped {}; clicks {}, right clicks {}, scrolls {}",
            self.frames_processed,
            elapsed.num_seconds(),
            self.fps(),
            self.frames_with_hand,
            self.frames_skipped,
            self.clicks,
            self.right_clicks,
            self.scrolls,
        )
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

// ==============================================================================
// Control Loop
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Quit,
}

pub struct ControlLoop<L: HandLandmarker, P: Preview, I: InputSink> {
    tracker: HandTracker<L>,
    preview: P,
    sink: I,
    options: LoopOptions,
    stats: RunStats,
    started: Instant,
    stop: Arc<AtomicBool>,
}

impl<L: HandLandmarker, P: Preview, I: InputSink> ControlLoop<L, P, I> {
    pub fn new(tracker: HandTracker<L>, preview: P, sink: I, options: LoopOptions) -> Self {
        Self {
            tracker,
            preview,
            sink,
            options,
            stats: RunStats::new(),
            started: Instant::now(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that ends the loop at the next iteration when set from another thread
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn sink(&self) -> &I {
        &self.sink
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Run until the quit key, a stop request or the end of the stream
    pub fn run<S: FrameSource>(&mut self, source: &mut S) -> &RunStats {
        self.started = Instant::now();
        self.stats = RunStats::new();

        while !self.stop_requested() {
            if self.options.drain_before_read {
                drain(source, self.options.drain_frames);
            }

            let frame = match source.read_frame() {
                Ok(frame) => frame,
                Err(CaptureError::EndOfStream) => {
                    log::info!("{} ended", source.describe());
                    break;
                }
                Err(e) => {
                    log::warn!("Skipping frame: {}", e);
                    self.stats.record(&FrameOutcome::Skipped { reason: e.to_string() });
                    if self.poll_quit() == LoopControl::Quit {
                        break;
                    }
                    continue;
                }
            };

            if self.options.drain_after_read {
                drain(source, self.options.drain_frames);
            }

            if self.step(&frame) == LoopControl::Quit {
                break;
            }
        }

        &self.stats
    }

    /// Same as [`run`](Self::run) with capture on a dedicated thread
    pub fn run_threaded<S: FrameSource + Send + 'static>(&mut self, mut source: S) -> &RunStats {
        self.started = Instant::now();
        self.stats = RunStats::new();

        let (tx, mut rx) = watch::channel::<Option<Arc<Frame>>>(None);
        let options = self.options;
        let consumer = std::thread::current();

        let capture = std::thread::spawn(move || {
            while !tx.is_closed() {
                if options.drain_before_read {
                    drain(&mut source, options.drain_frames);
                }

                match source.read_frame() {
                    Ok(frame) => {
                        if options.drain_after_read {
                            drain(&mut source, options.drain_frames);
                        }
                        // Overwrites any frame the processing side has not picked up yet
                        if tx.send(Some(Arc::new(frame))).is_err() {
                            break;
                        }
                        consumer.unpark();
                    }
                    Err(CaptureError::EndOfStream) => {
                        log::info!("{} ended", source.describe());
                        break;
                    }
                    Err(e) => {
                        log::warn!("Capture thread read failed: {}", e);
                        std::thread::sleep(CAPTURE_RETRY_DELAY);
                    }
                }
            }
            drop(tx);
            consumer.unpark();
        });

        while !self.stop_requested() {
            // Checked before reading so a frame sent just before the sender closed is still seen
            let finished = rx.has_changed().is_err();
            let fresh = {
                let latest = rx.borrow_and_update();
                if latest.has_changed() {
                    latest.clone()
                } else {
                    None
                }
            };

            match fresh {
                Some(frame) => {
                    if self.step(&frame) == LoopControl::Quit {
                        break;
                    }
                }
                None if finished => break,
                None => {
                    if self.poll_quit() == LoopControl::Quit {
                        break;
                    }
                    std::thread::park_timeout(FRAME_WAIT);
                }
            }
        }

        drop(rx);
        if capture.join().is_err() {
            log::error!("Capture thread panicked");
        }

        &self.stats
    }

    fn step(&mut self, frame: &Frame) -> LoopControl {
        let mirrored;
        let frame = if self.options.mirror {
            mirrored = frame.mirrored();
            &mirrored
        } else {
            frame
        };

        let outcome = self.tracker.process_frame(frame, self.started.elapsed());
        self.stats.record(&outcome);

        for action in outcome.actions() {
            if !action.is_move() {
                log::debug!("{}", action.to_string());
            }
            if let Err(e) = self.sink.perform(action) {
                log::warn!("Failed to perform {}: {}", action.to_string(), e);
                self.stats.failed_actions += 1;
            }
        }

        if let Err(e) = self.preview.show(frame, &overlay_for(&outcome)) {
            log::warn!("{}", e);
        }

        self.poll_quit()
    }

    fn poll_quit(&mut self) -> LoopControl {
        match self.preview.poll_key() {
            Ok(Some(QUIT_KEY)) => LoopControl::Quit,
            Ok(_) => LoopControl::Continue,
            Err(e) => {
                log::warn!("{}", e);
                LoopControl::Continue
            }
        }
    }
}

fn drain<S: FrameSource + ?Sized>(source: &mut S, count: u32) {
    if count == 0 {
        return;
    }
    if let Err(e) = source.drain(count) {
        log::debug!("Drain failed: {}", e);
    }
}

/// Annotations for the preview window
pub fn overlay_for(outcome: &FrameOutcome) -> FrameOverlay {
    match outcome {
        FrameOutcome::Processed {
            pose,
            labels,
            cursor,
            actions,
        } => {
            let gesture = labels.active_gesture().to_string();
            let event = actions.iter().find_map(|action| match action {
                MouseAction::LeftClick => Some("CLICK!".to_string()),
                MouseAction::RightClick => Some("RIGHT CLICK!".to_string()),
                MouseAction::Scroll { amount } => Some(format!("SCROLL: {}", amount)),
                MouseAction::Move { .. } => None,
            });

            FrameOverlay {
                hand: Some(pose.clone()),
                cursor: Some(*cursor),
                gesture: (!gesture.is_empty()).then_some(gesture),
                event,
            }
        }
        FrameOutcome::NoHand => FrameOverlay {
            event: Some("No hand detected".to_string()),
            ..FrameOverlay::default()
        },
        FrameOutcome::Skipped { .. } => FrameOverlay::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cursor_mapper::CursorMapper;
    use crate::core::gesture_classifier::tests::{open_hand, peace_sign, pinch};
    use crate::core::gesture_classifier::DEFAULT_PINCH_THRESHOLD;
    use crate::core::gesture_dispatcher::DispatchSettings;
    use crate::models::capture::CaptureResult;
    use crate::models::input::ScreenSize;
    use crate::models::pose::HandPose;
    use crate::platform::capture::{NullPreview, SyntheticCamera};
    use crate::platform::input::DryRunSink;
    use crate::platform::pose::ReplayLandmarker;

    fn control_loop(
        frames: Vec<Option<HandPose>>,
        options: LoopOptions,
    ) -> ControlLoop<ReplayLandmarker, NullPreview, DryRunSink> {
        let screen = ScreenSize::new(1920, 1080);
        let tracker = HandTracker::new(
            ReplayLandmarker::from_frames(frames),
            CursorMapper::new(screen, 0.0),
            DispatchSettings::default(),
            DEFAULT_PINCH_THRESHOLD,
            true,
        );
        ControlLoop::new(tracker, NullPreview, DryRunSink::new(screen), options)
    }

    /// Preview that asks to quit after a fixed number of polls
    struct QuitAfter(u32);

    impl Preview for QuitAfter {
        fn show(&mut self, _frame: &Frame, _overlay: &FrameOverlay) -> CaptureResult<()> {
            Ok(())
        }

        fn poll_key(&mut self) -> CaptureResult<Option<char>> {
            if self.0 == 0 {
                return Ok(Some(QUIT_KEY));
            }
            self.0 -= 1;
            Ok(None)
        }
    }

    #[test]
    fn test_run_until_end_of_stream() {
        let mut control = control_loop(vec![None, Some(pinch()), Some(peace_sign())], LoopOptions::default());
        let mut camera = SyntheticCamera::new(4, 4, Some(3));

        let stats = control.run(&mut camera).clone();
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.frames_with_hand, 2);
        assert_eq!(stats.clicks, 1);
        assert_eq!(stats.right_clicks, 1);

        let performed = control.sink().recent();
        assert_eq!(performed.len(), 4);
        assert!(performed[0].is_move());
        assert_eq!(performed[1], MouseAction::LeftClick);
        assert_eq!(performed[3], MouseAction::RightClick);
    }

    #[test]
    fn test_quit_key_stops_loop() {
        let screen = ScreenSize::new(800, 600);
        let tracker = HandTracker::new(
            ReplayLandmarker::from_frames(vec![Some(open_hand()); 10]),
            CursorMapper::new(screen, 0.1),
            DispatchSettings::default(),
            DEFAULT_PINCH_THRESHOLD,
            true,
        );
        let mut control = ControlLoop::new(tracker, QuitAfter(2), DryRunSink::new(screen), LoopOptions::default());
        let mut camera = SyntheticCamera::new(4, 4, None);

        let stats = control.run(&mut camera);
        assert_eq!(stats.frames_processed, 3);
    }

    #[test]
    fn test_drain_policy() {
        let options = LoopOptions {
            drain_frames: 5,
            drain_before_read: true,
            ..LoopOptions::default()
        };
        let mut control = control_loop(vec![None; 2], options);
        let mut camera = SyntheticCamera::new(4, 4, Some(2));
        control.run(&mut camera);

        // Drained before each of the two reads and before the final end-of-stream read
        assert_eq!(camera.frames_drained(), 15);
        assert_eq!(camera.frames_read(), 2);
    }

    #[test]
    fn test_stop_handle_ends_run() {
        let mut control = control_loop(Vec::new(), LoopOptions::default());
        control.stop_handle().store(true, Ordering::Relaxed);

        let mut camera = SyntheticCamera::new(4, 4, None);
        let stats = control.run(&mut camera);
        assert_eq!(stats.frames_processed, 0);
        assert_eq!(camera.frames_read(), 0);
    }

    #[test]
    fn test_threaded_run_ends_with_stream() {
        let mut control = control_loop(vec![Some(open_hand()); 50], LoopOptions::default());
        let camera = SyntheticCamera::new(4, 4, Some(50));

        let stats = control.run_threaded(camera);
        // Latest-frame-wins may drop frames, but never invents them, and the last one always lands
        assert!(stats.frames_processed >= 1);
        assert!(stats.frames_processed <= 50);
        assert_eq!(stats.frames_skipped, 0);
    }

    #[test]
    fn test_threaded_run_keeps_final_frame() {
        for _ in 0..20 {
            let mut control = control_loop(vec![Some(pinch())], LoopOptions::default());
            let camera = SyntheticCamera::new(4, 4, Some(1));

            let stats = control.run_threaded(camera).clone();
            assert_eq!(stats.frames_processed, 1);
            assert_eq!(stats.clicks, 1);
            assert_eq!(control.sink().recent().last(), Some(&MouseAction::LeftClick));
        }
    }

    #[test]
    fn test_threaded_run_waits_for_slow_source() {
        /// Source that takes a while per frame so the processing side idles between them
        struct Slow(SyntheticCamera);

        impl FrameSource for Slow {
            fn read_frame(&mut self) -> CaptureResult<Frame> {
                std::thread::sleep(Duration::from_millis(30));
                self.0.read_frame()
            }

            fn drain(&mut self, count: u32) -> CaptureResult<()> {
                self.0.drain(count)
            }

            fn describe(&self) -> String {
                self.0.describe()
            }
        }

        let mut control = control_loop(vec![Some(open_hand()); 5], LoopOptions::default());
        let stats = control.run_threaded(Slow(SyntheticCamera::new(4, 4, Some(5))));
        assert_eq!(stats.frames_processed, 5);
    }

    #[test]
    fn test_overlay_labels() {
        let overlay = overlay_for(&FrameOutcome::NoHand);
        assert_eq!(overlay.event.as_deref(), Some("No hand detected"));
        assert!(overlay.hand.is_none());

        let pose = pinch();
        let outcome = FrameOutcome::Processed {
            labels: crate::core::gesture_classifier::classify(&pose, DEFAULT_PINCH_THRESHOLD),
            pose,
            cursor: crate::models::input::Point::new(5, 6),
            actions: vec![MouseAction::LeftClick],
        };
        let overlay = overlay_for(&outcome);
        assert_eq!(overlay.gesture, Some("Pinch"));
        assert_eq!(overlay.event.as_deref(), Some("CLICK!"));
    }

    #[test]
    fn test_stats_count_skipped_frames_separately() {
        let mut stats = RunStats::new();
        stats.record(&FrameOutcome::Skipped { reason: "timeout".to_string() });
        stats.record(&FrameOutcome::NoHand);
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(stats.frames_processed, 1);
        assert!(stats.summary().contains("skipped 1"));
    }
}
