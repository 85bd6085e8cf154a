//! Resona Effects - Offline audio restoration DSP
//!
//! CPU restoration passes applied to editor selections. All tuning
//! parameters are passed explicitly on the pass structs; there is no
//! effect registry and no global preference state.

pub mod click;

pub use click::{ClickRemoval, ClickScanner, FindClicks, WINDOW_SIZE};
