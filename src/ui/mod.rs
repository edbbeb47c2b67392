//! Terminal output.
//!
//! - [`Reporter`] writes the version line and diagnostics, and picks the exit status
//! - [`CheckerTheme`] styles diagnostics, colored or plain

pub mod reporter;
pub mod theme;

pub use reporter::Reporter;
pub use theme::{CheckerTheme, DIAGNOSTIC_TAG};
