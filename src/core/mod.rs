pub mod config;
pub mod ml_models;
pub mod diagnostics;

// Hand tracking pipeline
pub mod gesture_classifier;
pub mod cursor_mapper;
pub mod gesture_dispatcher;
pub mod hand_tracker;
pub mod control_loop;
