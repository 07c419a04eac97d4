//! Date pattern translation
//!
//! The filter carries two patterns:
//!
//! - the state format, a PHP `date()` pattern (`d/m/Y`) that the submitted
//!   range string is written in and parsed with;
//! - the display format, a moment.js pattern (`DD/MM/YYYY`) the picker widget
//!   shows to the user.
//!
//! Both are translated to chrono strftime strings up front.

pub mod moment;
pub mod php;

pub use moment::{DEFAULT_DISPLAY_FORMAT, DisplayFormat};
pub use php::{DEFAULT_DATE_FORMAT, DateFormat};
