// Mouse input injection - moves the cursor, clicks and scrolls on behalf of the user

use crate::models::input::{InputResult, MouseAction, Point, ScreenSize};

// Native injectors
#[cfg(all(target_os = "macos", feature = "native-input"))]
pub mod mouse_macos;
#[cfg(all(target_os = "macos", feature = "native-input"))]
pub use mouse_macos::MacOSMouseInjector as NativeMouse;

#[cfg(all(target_os = "windows", feature = "native-input"))]
pub mod mouse_windows;
#[cfg(all(target_os = "windows", feature = "native-input"))]
pub use mouse_windows::WindowsMouseInjector as NativeMouse;

#[cfg(all(target_os = "linux", feature = "native-input"))]
pub mod mouse_linux;
#[cfg(all(target_os = "linux", feature = "native-input"))]
pub use mouse_linux::LinuxMouseInjector as NativeMouse;

pub mod dry_run;

pub use dry_run::DryRunSink;

/// Destination for mouse actions
///
/// Injectors never abort when the cursor reaches a screen corner and add no
/// delay between calls.
pub trait InputSink {
    fn screen_size(&self) -> InputResult<ScreenSize>;

    fn move_to(&mut self, target: Point) -> InputResult<()>;

    fn left_click(&mut self) -> InputResult<()>;

    fn right_click(&mut self) -> InputResult<()>;

    /// Positive scrolls up, negative scrolls down, in wheel clicks
    fn scroll(&mut self, amount: i32) -> InputResult<()>;

    fn perform(&mut self, action: &MouseAction) -> InputResult<()> {
        match *action {
            MouseAction::Move { target } => self.move_to(target),
            MouseAction::LeftClick => self.left_click(),
            MouseAction::RightClick => self.right_click(),
            MouseAction::Scroll { amount } => self.scroll(amount),
        }
    }
}

impl<T: InputSink + ?Sized> InputSink for Box<T> {
    fn screen_size(&self) -> InputResult<ScreenSize> {
        (**self).screen_size()
    }

    fn move_to(&mut self, target: Point) -> InputResult<()> {
        (**self).move_to(target)
    }

    fn left_click(&mut self) -> InputResult<()> {
        (**self).left_click()
    }

    fn right_click(&mut self) -> InputResult<()> {
        (**self).right_click()
    }

    fn scroll(&mut self, amount: i32) -> InputResult<()> {
        (**self).scroll(amount)
    }
}

/// Whether this build can drive the real mouse
pub fn native_input_available() -> bool {
    cfg!(all(
        feature = "native-input",
        any(target_os = "linux", target_os = "windows", target_os = "macos")
    ))
}
