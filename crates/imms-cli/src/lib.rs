//! Command-line front end for the immunization notice preprocessor.

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
