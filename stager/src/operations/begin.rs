//! Begin: copy the active directory to a new staging directory.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::operations::OperationOptions;
use crate::precondition::PreconditionCatalogue;
use crate::process::OutputSink;
use crate::sync::FileSyncer;

/// Creates the staging directory as a mirror of the active directory.
#[derive(Debug, Clone)]
pub struct Beginner {
    preconditions: Arc<PreconditionCatalogue>,
    syncer: Arc<dyn FileSyncer>,
}

impl Beginner {
    /// Creates a beginner using the given trees and synchronizer.
    #[must_use]
    pub fn new(preconditions: Arc<PreconditionCatalogue>, syncer: Arc<dyn FileSyncer>) -> Self {
        Self {
            preconditions,
            syncer,
        }
    }

    /// Begin the staging process.
    ///
    /// The staging directory must not exist yet. Excluded paths are not
    /// copied.
    ///
    /// # Errors
    ///
    /// - [`Error::PreconditionUnfulfilled`] if the begin tree is unfulfilled.
    /// - [`Error::Runtime`] wrapping any other failure.
    pub fn begin(&self, options: &OperationOptions, sink: Option<&mut dyn OutputSink>) -> Result<()> {
        self.run(options, sink).map_err(Error::into_runtime)
    }

    fn run(&self, options: &OperationOptions, sink: Option<&mut dyn OutputSink>) -> Result<()> {
        self.preconditions
            .begin()
            .assert_is_fulfilled(&options.check_context())?;

        log::info!(
            "beginning: {} -> {}",
            options.active_dir.absolute(),
            options.staging_dir.absolute()
        );
        self.syncer.sync(
            &options.active_dir,
            &options.staging_dir,
            &options.exclusions,
            sink,
            options.timeout,
        )
    }
}
