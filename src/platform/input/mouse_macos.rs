#![cfg(target_os = "macos")]

use super::InputSink;
use crate::models::input::{InputError, InputResult, Point, ScreenSize};

use core_graphics::display::CGDisplay;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton, ScrollEventUnit};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;

/// Posts synthetic Quartz events. Needs the Accessibility permission.
pub struct MacOSMouseInjector {
    position: CGPoint,
}

impl MacOSMouseInjector {
    pub fn new() -> InputResult<Self> {
        let position = CGEvent::new(Self::source()?)
            .map(|event| event.location())
            .unwrap_or_else(|_| CGPoint::new(0.0, 0.0));
        Ok(Self { position })
    }

    fn source() -> InputResult<CGEventSource> {
        CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| InputError::InjectionFailed("Failed to create CGEventSource".to_string()))
    }

    fn post_mouse(&self, event_type: CGEventType, button: CGMouseButton) -> InputResult<()> {
        let event = CGEvent::new_mouse_event(Self::source()?, event_type, self.position, button)
            .map_err(|_| InputError::InjectionFailed("Failed to create mouse event".to_string()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}

impl InputSink for MacOSMouseInjector {
    fn screen_size(&self) -> InputResult<ScreenSize> {
        let bounds = CGDisplay::main().bounds();
        Ok(ScreenSize::new(bounds.size.width as u32, bounds.size.height as u32))
    }

    fn move_to(&mut self, target: Point) -> InputResult<()> {
        self.position = CGPoint::new(target.x as f64, target.y as f64);
        self.post_mouse(CGEventType::MouseMoved, CGMouseButton::Left)
    }

    fn left_click(&mut self) -> InputResult<()> {
        self.post_mouse(CGEventType::LeftMouseDown, CGMouseButton::Left)?;
        self.post_mouse(CGEventType::LeftMouseUp, CGMouseButton::Left)
    }

    fn right_click(&mut self) -> InputResult<()> {
        self.post_mouse(CGEventType::RightMouseDown, CGMouseButton::Right)?;
        self.post_mouse(CGEventType::RightMouseUp, CGMouseButton::Right)
    }

    fn scroll(&mut self, amount: i32) -> InputResult<()> {
        let event = CGEvent::new_scroll_event(Self::source()?, ScrollEventUnit::LINE, 1, amount, 0, 0)
            .map_err(|_| InputError::InjectionFailed("Failed to create scroll event".to_string()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }
}
