//! Library components of the sample uploader CLI.

pub mod config;
pub mod logging;
