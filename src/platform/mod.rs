//! Host implementations
//!
//! - `manual`: virtual clock for tests and the headless native binary
//! - `web`: requestAnimationFrame, setTimeout and ResizeObserver (WASM only)

pub mod manual;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use manual::{ManualHost, pump};
