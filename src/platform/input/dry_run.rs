// Input sink that logs actions instead of injecting them

use super::InputSink;
use crate::models::input::{InputResult, MouseAction, Point, ScreenSize};
use std::collections::VecDeque;

/// Recent actions kept for inspection, oldest evicted first
pub const DEFAULT_HISTORY: usize = 256;

pub struct DryRunSink {
    screen: ScreenSize,
    history: VecDeque<MouseAction>,
    capacity: usize,
    total: u64,
}

impl DryRunSink {
    pub fn new(screen: ScreenSize) -> Self {
        Self::with_history(screen, DEFAULT_HISTORY)
    }

    pub fn with_history(screen: ScreenSize, capacity: usize) -> Self {
        Self {
            screen,
            history: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// The most recent actions, oldest first
    pub fn recent(&self) -> Vec<MouseAction> {
        self.history.iter().copied().collect()
    }

    /// Number of actions received over the sink's lifetime
    pub fn total(&self) -> u64 {
        self.total
    }

    fn record(&mut self, action: MouseAction) {
        // Moves arrive every frame and would flood the log
        if action.is_move() {
            log::trace!("dry-run {:?}", action);
        } else {
            log::info!("dry-run {:?}", action);
        }

        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(action);
    }
}

impl InputSink for DryRunSink {
    fn screen_size(&self) -> InputResult<ScreenSize> {
        Ok(self.screen)
    }

    fn move_to(&mut self, target: Point) -> InputResult<()> {
        self.record(MouseAction::Move { target });
        Ok(())
    }

    fn left_click(&mut self) -> InputResult<()> {
        self.record(MouseAction::LeftClick);
        Ok(())
    }

    fn right_click(&mut self) -> InputResult<()> {
        self.record(MouseAction::RightClick);
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> InputResult<()> {
        self.record(MouseAction::Scroll { amount });
        Ok(())
    }
}
