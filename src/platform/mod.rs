// Platform integrations: cameras, hand landmark detection and mouse injection

pub mod capture;
pub mod input;
pub mod pose;
