//! Esign Capture - interchangeable signature capture strategies
//!
//! Three mechanisms can produce a signature payload: a checkbox bit, a typed
//! name, and a freehand drawing. All three sit behind the `CaptureStrategy`
//! contract (`reset` / `is_empty` / `serialize`) so the session controller
//! never branches on the method outside of selection. A future mechanism
//! (e.g. biometric) is one new strategy, not a codebase-wide branch.

#![deny(unsafe_code)]

mod drawn;
mod raster;
mod selector;
mod strategy;

pub use drawn::{DrawnCapture, Point, Stroke};
pub use raster::{encode_bmp_data_url, rasterize};
pub use selector::CaptureSelector;
pub use strategy::{CaptureError, CaptureStrategy, CheckboxCapture, TypedCapture};
