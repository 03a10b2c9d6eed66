//! Temporarily hide installed modules from an npm command.
//!
//! The pieces, leaves first:
//! - [`locator`] finds which requested modules are installed
//! - [`mover`] relocates module directories, across filesystems if needed
//! - [`manifest`] snapshots and edits `package.json`
//! - [`runner`] runs the external command
//! - [`interrupt`] keeps Ctrl-C from cutting a run short
//! - [`coordinator`] ties them together and always restores

pub mod coordinator;
pub mod interrupt;
pub mod locator;
pub mod manifest;
pub mod mover;
pub mod request;
pub mod result;
pub mod runner;

pub use coordinator::{RunState, StagingCoordinator, StagingGuard};
pub use interrupt::InterruptShield;
pub use manifest::ManifestEditor;
pub use request::ExclusionRequest;
pub use result::{ManifestSnapshot, ResolvedDirectory, RunResult, StagedDirectory};
pub use runner::{CommandOutcome, CommandRunner, ProcessRunner};
