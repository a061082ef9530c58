/// Local files picked for upload
///
/// This module handles:
/// - Scanning picked folders for image files
/// - Decoding and downsizing local previews
/// - Tracking which previews are alive so they can be released

pub mod preview;
pub mod scan;
