/// Configuration subsystem - Display and backend settings
///
/// This module handles loading configuration from .pastesheetrc files;
/// command-line flags are layered on top in `main`.

pub mod rc;

// Re-export public interface
pub use rc::{RcConfig, RcLoader};
