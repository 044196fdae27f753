//! Wiring for the four operations.

use std::sync::Arc;

use crate::config::Config;
use crate::operations::{Beginner, Cleaner, Committer, Stager};
use crate::precondition::PreconditionCatalogue;
use crate::process::{ProcessRunner, SystemProcessRunner};
use crate::sync::{syncer_for, FileSyncer};

/// All four operations, wired once from a [`Config`].
///
/// The operations share one precondition catalogue, one synchronizer, and
/// one process runner.
///
/// # Examples
///
/// ```
/// use stager::config::Config;
/// use stager::operations::Workflow;
/// use stager::sync::SyncerKind;
///
/// let workflow = Workflow::from_config(&Config::default());
/// assert_eq!(workflow.syncer().kind(), SyncerKind::Native);
/// assert_eq!(workflow.stager().package_manager(), "composer");
/// ```
#[derive(Debug, Clone)]
pub struct Workflow {
    preconditions: Arc<PreconditionCatalogue>,
    syncer: Arc<dyn FileSyncer>,
    beginner: Beginner,
    stager: Stager,
    committer: Committer,
    cleaner: Cleaner,
}

impl Workflow {
    /// Wire the operations with a [`SystemProcessRunner`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_runner(config, Arc::new(SystemProcessRunner::new()))
    }

    /// Wire the operations with a custom process runner.
    #[must_use]
    pub fn with_runner(config: &Config, runner: Arc<dyn ProcessRunner>) -> Self {
        let preconditions = Arc::new(PreconditionCatalogue::new(config, Arc::clone(&runner)));
        let syncer: Arc<dyn FileSyncer> = Arc::from(syncer_for(
            config.syncer_kind(),
            config.rsync_executable(),
            Arc::clone(&runner),
        ));
        log::debug!(
            "wired workflow: syncer={}, package manager={}",
            config.syncer_kind(),
            config.package_manager_executable()
        );

        Self {
            beginner: Beginner::new(Arc::clone(&preconditions), Arc::clone(&syncer)),
            stager: Stager::new(
                Arc::clone(&preconditions),
                runner,
                config.package_manager_executable(),
            ),
            committer: Committer::new(Arc::clone(&preconditions), Arc::clone(&syncer)),
            cleaner: Cleaner::new(Arc::clone(&preconditions)),
            preconditions,
            syncer,
        }
    }

    /// The begin operation.
    #[must_use]
    pub fn beginner(&self) -> &Beginner {
        &self.beginner
    }

    /// The stage operation.
    #[must_use]
    pub fn stager(&self) -> &Stager {
        &self.stager
    }

    /// The commit operation.
    #[must_use]
    pub fn committer(&self) -> &Committer {
        &self.committer
    }

    /// The clean operation.
    #[must_use]
    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }

    /// The shared precondition trees.
    #[must_use]
    pub fn preconditions(&self) -> &PreconditionCatalogue {
        &self.preconditions
    }

    /// The shared synchronizer.
    #[must_use]
    pub fn syncer(&self) -> &dyn FileSyncer {
        self.syncer.as_ref()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;
    use crate::sync::SyncerKind;

    #[test]
    fn test_rsync_config_selects_rsync_backend() {
        let workflow = Workflow::from_config(&Config {
            syncer: Some(SyncerKind::Rsync),
            ..Default::default()
        });
        assert_eq!(workflow.syncer().kind(), SyncerKind::Rsync);
    }

    #[test]
    fn test_full_cycle() {
        let fx = Fixture::new();
        let options = fx.options();

        fx.workflow.beginner().begin(&options, None).unwrap();
        std::fs::write(fx.staging().join("composer.lock"), "{}").unwrap();
        fx.workflow
            .stager()
            .stage(&["install".to_string()], &options, None)
            .unwrap();
        fx.workflow.committer().commit(&options, None).unwrap();
        fx.workflow.cleaner().clean(&options, None).unwrap();

        assert!(fx.active().join("composer.lock").is_file());
        assert!(!fx.staging().exists());
        assert_eq!(fx.recorded().len(), 1);
    }
}
