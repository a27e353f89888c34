#![cfg(target_os = "linux")]

use super::InputSink;
use crate::models::input::{InputError, InputResult, Point, ScreenSize};
use std::os::raw::c_int;
use std::ptr;
use x11::{xlib, xtest};

const BUTTON_LEFT: u32 = 1;
const BUTTON_RIGHT: u32 = 3;
const BUTTON_WHEEL_UP: u32 = 4;
const BUTTON_WHEEL_DOWN: u32 = 5;

/// Injects pointer events through the XTest extension
pub struct LinuxMouseInjector {
    display: *mut xlib::Display,
    screen: c_int,
}

impl LinuxMouseInjector {
    pub fn new() -> InputResult<Self> {
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(InputError::DisplayUnavailable(
                "Failed to open X11 display (is DISPLAY set?)".to_string(),
            ));
        }

        let (mut event_base, mut error_base, mut major, mut minor) = (0, 0, 0, 0);
        let has_xtest = unsafe {
            xtest::XTestQueryExtension(display, &mut event_base, &mut error_base, &mut major, &mut minor)
        };
        if has_xtest == 0 {
            unsafe { xlib::XCloseDisplay(display) };
            return Err(InputError::DisplayUnavailable(
                "X server does not support the XTest extension".to_string(),
            ));
        }

        let screen = unsafe { xlib::XDefaultScreen(display) };
        log::debug!("XTest {}.{} available on screen {}", major, minor, screen);

        Ok(Self { display, screen })
    }

    fn press_and_release(&mut self, button: u32) -> InputResult<()> {
        unsafe {
            let pressed = xtest::XTestFakeButtonEvent(self.display, button, xlib::True, 0);
            let released = xtest::XTestFakeButtonEvent(self.display, button, xlib::False, 0);
            if pressed == 0 || released == 0 {
                return Err(InputError::InjectionFailed(format!("button {} event rejected", button)));
            }
        }
        self.flush();
        Ok(())
    }

    fn flush(&self) {
        unsafe {
            xlib::XFlush(self.display);
        }
    }
}

impl InputSink for LinuxMouseInjector {
    fn screen_size(&self) -> InputResult<ScreenSize> {
        let (width, height) = unsafe {
            (
                xlib::XDisplayWidth(self.display, self.screen),
                xlib::XDisplayHeight(self.display, self.screen),
            )
        };
        Ok(ScreenSize::new(width.max(0) as u32, height.max(0) as u32))
    }

    fn move_to(&mut self, target: Point) -> InputResult<()> {
        let ok = unsafe { xtest::XTestFakeMotionEvent(self.display, self.screen, target.x, target.y, 0) };
        if ok == 0 {
            return Err(InputError::InjectionFailed("motion event rejected".to_string()));
        }
        self.flush();
        Ok(())
    }

    fn left_click(&mut self) -> InputResult<()> {
        self.press_and_release(BUTTON_LEFT)
    }

    fn right_click(&mut self) -> InputResult<()> {
        self.press_and_release(BUTTON_RIGHT)
    }

    fn scroll(&mut self, amount: i32) -> InputResult<()> {
        // X11 has no wheel delta; each wheel click is a button 4/5 press
        let button = if amount > 0 { BUTTON_WHEEL_UP } else { BUTTON_WHEEL_DOWN };
        for _ in 0..amount.unsigned_abs() {
            self.press_and_release(button)?;
        }
        Ok(())
    }
}

impl Drop for LinuxMouseInjector {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.display);
        }
    }
}
