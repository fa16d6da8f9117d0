pub mod config;
pub mod controller;
pub mod gripper;
pub mod hw;
pub mod lives;
pub mod messages;
pub mod motion;
pub mod remote;
pub mod runtime;
