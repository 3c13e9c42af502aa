//! Command handlers grouped by concern.

mod archive;
mod scan;

pub(crate) use archive::{handle_archive, handle_check};
pub(crate) use scan::handle_scan;
