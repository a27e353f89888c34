// Data models for camera capture, hand tracking, and synthesized input

pub mod capture;
pub mod input;
pub mod pose;
