#![cfg(target_os = "windows")]

use super::InputSink;
use crate::models::input::{InputError, InputResult, Point, ScreenSize};

use windows::Win32::UI::{
    Input::KeyboardAndMouse::{
        mouse_event, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_RIGHTDOWN,
        MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_WHEEL, MOUSE_EVENT_FLAGS,
    },
    WindowsAndMessaging::{GetSystemMetrics, SetCursorPos, SM_CXSCREEN, SM_CYSCREEN},
};

// One notch of the wheel
const WHEEL_DELTA: i32 = 120;

pub struct WindowsMouseInjector;

impl WindowsMouseInjector {
    pub fn new() -> InputResult<Self> {
        Ok(Self)
    }

    fn send(flags: MOUSE_EVENT_FLAGS, data: i32) {
        unsafe { mouse_event(flags, 0, 0, data, 0) };
    }
}

impl InputSink for WindowsMouseInjector {
    fn screen_size(&self) -> InputResult<ScreenSize> {
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width <= 0 || height <= 0 {
            return Err(InputError::DisplayUnavailable("GetSystemMetrics returned no screen".to_string()));
        }
        Ok(ScreenSize::new(width as u32, height as u32))
    }

    fn move_to(&mut self, target: Point) -> InputResult<()> {
        unsafe { SetCursorPos(target.x, target.y) }
            .map_err(|e| InputError::InjectionFailed(format!("SetCursorPos: {}", e)))
    }

    fn left_click(&mut self) -> InputResult<()> {
        Self::send(MOUSEEVENTF_LEFTDOWN, 0);
        Self::send(MOUSEEVENTF_LEFTUP, 0);
        Ok(())
    }

    fn right_click(&mut self) -> InputResult<()> {
        Self::send(MOUSEEVENTF_RIGHTDOWN, 0);
        Self::send(MOUSEEVENTF_RIGHTUP, 0);
        Ok(())
    }

    fn scroll(&mut self, amount: i32) -> InputResult<()> {
        Self::send(MOUSEEVENTF_WHEEL, amount.saturating_mul(WHEEL_DELTA));
        Ok(())
    }
}
