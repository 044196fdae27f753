//! Commit: make the staged changes live.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::operations::OperationOptions;
use crate::precondition::PreconditionCatalogue;
use crate::process::OutputSink;
use crate::sync::FileSyncer;

/// Mirrors the staging directory back over the active directory.
#[derive(Debug, Clone)]
pub struct Committer {
    preconditions: Arc<PreconditionCatalogue>,
    syncer: Arc<dyn FileSyncer>,
}

impl Committer {
    /// Creates a committer using the given trees and synchronizer.
    #[must_use]
    pub fn new(preconditions: Arc<PreconditionCatalogue>, syncer: Arc<dyn FileSyncer>) -> Self {
        Self {
            preconditions,
            syncer,
        }
    }

    /// Commit staged changes to the active directory.
    ///
    /// Use the same exclusions as `begin`; excluded paths in the active
    /// directory are left exactly as they are.
    ///
    /// # Errors
    ///
    /// - [`Error::PreconditionUnfulfilled`] if the commit tree is unfulfilled.
    /// - [`Error::Runtime`] wrapping any other failure.
    pub fn commit(&self, options: &OperationOptions, sink: Option<&mut dyn OutputSink>) -> Result<()> {
        self.run(options, sink).map_err(Error::into_runtime)
    }

    fn run(&self, options: &OperationOptions, sink: Option<&mut dyn OutputSink>) -> Result<()> {
        self.preconditions
            .commit()
            .assert_is_fulfilled(&options.check_context())?;

        log::info!(
            "committing: {} -> {}",
            options.staging_dir.absolute(),
            options.active_dir.absolute()
        );
        self.syncer.sync(
            &options.staging_dir,
            &options.active_dir,
            &options.exclusions,
            sink,
            options.timeout,
        )
    }
}
