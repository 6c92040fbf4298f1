//! Tag normalization
//!
//! Pure functions that turn loosely-structured tag values into canonical
//! forms: multi-value splitting, ID3 genre resolution, date and release-type
//! parsing, and display/sort name interpretation. Nothing in this module
//! performs I/O; every function is a pure function of its inputs and the
//! user configuration.

pub mod date;
pub mod id3;
pub mod interpret;
pub mod name;
pub mod release_type;
pub mod util;

pub use date::{Date, DateRange};
pub use name::Name;
pub use release_type::{Refinement, ReleaseType};
