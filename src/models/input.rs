// Data models for synthesized mouse input

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size of the screen the cursor is driven across, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

// ==============================================================================
// Mouse Actions
// ==============================================================================

/// A single action to be injected into the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MouseAction {
    Move { target: Point },
    LeftClick,
    RightClick,
    /// Positive scrolls up, negative scrolls down
    Scroll { amount: i32 },
}

impl MouseAction {
    pub fn to_string(&self) -> &'static str {
        match self {
            MouseAction::Move { .. } => "move",
            MouseAction::LeftClick => "left_click",
            MouseAction::RightClick => "right_click",
            MouseAction::Scroll { .. } => "scroll",
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, MouseAction::Move { .. })
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Display unavailable: {0}")]
    DisplayUnavailable(String),

    #[error("Input injection failed: {0}")]
    InjectionFailed(String),

    #[error("Native input not compiled in (enable the 'native-input' feature)")]
    NotSupported,
}

pub type InputResult<T> = Result<T, InputError>;
