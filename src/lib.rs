//! Motion-gated entropy key generator.
//!
//! Device motion drives the open time of a gate in front of a free running
//! oscillator/counter. The counter value after an acquisition window is one
//! byte of entropy; sixteen of them form a key, which is wrapped with AES-128
//! under the device key and reported to the host over serial together with
//! the password settings chosen in the on-device menu.
//!
//! Everything in here is generic over `embedded-hal` traits. The board
//! specific glue lives in the firmware binary.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod trace;

pub mod app;
pub mod config;
pub mod counter;
pub mod demo;
pub mod display;
pub mod edge;
pub mod entropy;
pub mod error;
pub mod input;
pub mod key;
pub mod menu;
pub mod motion;
pub mod protocol;
pub mod settings;
pub mod time;

pub use app::App;
pub use config::Config;
pub use error::Error;
pub use settings::{Complexity, Settings};
