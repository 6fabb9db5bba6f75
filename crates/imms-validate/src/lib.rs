#![deny(unsafe_code)]

//! Facility resolution against the PHIX reference registry.

pub mod error;
pub mod resolver;

pub use error::{FacilityError, MAX_LISTED_UNMATCHED, Result};
pub use resolver::{DEFAULT_FUZZY_THRESHOLD, FacilityResolver, Resolution};
