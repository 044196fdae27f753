//! The fixed set of precondition trees each operation asserts.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::precondition::{
    ActiveAndStagingDirsAreDifferent, DirExists, DirIsWritable, ExecutableIsAvailable,
    NoAbsoluteSymlinksExist, NoHardLinksExist, NoLinksExistOnWindows,
    NoSymlinksPointOutsideTheCodebase, NoSymlinksPointToADirectory, Precondition,
    PreconditionTree, StagingDirDoesNotExist, StagingDirIsNotNested,
};
use crate::process::ProcessRunner;
use crate::sync::SyncerKind;

/// The four staging operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Copy the active directory to a new staging directory.
    Begin,
    /// Run a package manager command in the staging directory.
    Stage,
    /// Copy the staging directory back over the active directory.
    Commit,
    /// Remove the staging directory.
    Clean,
}

impl Operation {
    /// Every operation, in workflow order.
    pub const ALL: [Self; 4] = [Self::Begin, Self::Stage, Self::Commit, Self::Clean];

    /// Lower-case operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::Clean => "clean",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precondition trees for every operation, assembled once from a [`Config`].
///
/// The trees are stateless and may be evaluated any number of times.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use stager::config::Config;
/// use stager::precondition::{Operation, PreconditionCatalogue};
/// use stager::process::SystemProcessRunner;
///
/// let catalogue = PreconditionCatalogue::new(&Config::default(), Arc::new(SystemProcessRunner::new()));
/// let begin = catalogue.for_operation(Operation::Begin);
/// assert_eq!(begin.name(), "BeginnerPreconditions");
/// assert!(begin.leaves().iter().any(|leaf| leaf.name() == "StagingDirDoesNotExist"));
/// ```
#[derive(Debug)]
pub struct PreconditionCatalogue {
    begin: Precondition,
    stage: Precondition,
    commit: Precondition,
    clean: Precondition,
}

impl PreconditionCatalogue {
    /// Wire every tree for the configured tools and backend.
    #[must_use]
    pub fn new(config: &Config, runner: Arc<dyn ProcessRunner>) -> Self {
        let wiring = Wiring { config, runner };
        Self {
            begin: tree(
                "BeginnerPreconditions",
                "The preconditions for beginning the staging process.",
                "Ready to begin the staging process.",
                vec![
                    wiring.common(),
                    Precondition::leaf(StagingDirDoesNotExist),
                    wiring.no_unsupported_links(),
                ],
            ),
            stage: tree(
                "StagerPreconditions",
                "The preconditions for staging changes.",
                "Ready to stage changes.",
                vec![wiring.common(), staging_dir_is_ready()],
            ),
            commit: tree(
                "CommitterPreconditions",
                "The preconditions for making staged changes live.",
                "Ready to commit staged changes.",
                vec![
                    wiring.common(),
                    staging_dir_is_ready(),
                    wiring.no_unsupported_links(),
                ],
            ),
            clean: tree(
                "CleanerPreconditions",
                "The preconditions for removing the staging directory.",
                "Ready to remove the staging directory.",
                vec![wiring.common(), staging_dir_is_ready()],
            ),
        }
    }

    /// The tree `begin` asserts.
    #[must_use]
    pub fn begin(&self) -> &Precondition {
        &self.begin
    }

    /// The tree `stage` asserts.
    #[must_use]
    pub fn stage(&self) -> &Precondition {
        &self.stage
    }

    /// The tree `commit` asserts.
    #[must_use]
    pub fn commit(&self) -> &Precondition {
        &self.commit
    }

    /// The tree `clean` asserts.
    #[must_use]
    pub fn clean(&self) -> &Precondition {
        &self.clean
    }

    /// The tree for `operation`.
    #[must_use]
    pub fn for_operation(&self, operation: Operation) -> &Precondition {
        match operation {
            Operation::Begin => &self.begin,
            Operation::Stage => &self.stage,
            Operation::Commit => &self.commit,
            Operation::Clean => &self.clean,
        }
    }
}

fn tree(
    name: &str,
    description: &str,
    fulfilled_message: &str,
    children: Vec<Precondition>,
) -> Precondition {
    PreconditionTree::new(name, description, fulfilled_message, children).into()
}

fn active_dir_is_ready() -> Precondition {
    tree(
        "ActiveDirIsReady",
        "The active directory must exist and be writable.",
        "The active directory is ready to use.",
        vec![
            Precondition::leaf(DirExists::active()),
            Precondition::leaf(DirIsWritable::active()),
        ],
    )
}

fn staging_dir_is_ready() -> Precondition {
    tree(
        "StagingDirIsReady",
        "The staging directory must exist and be writable.",
        "The staging directory is ready to use.",
        vec![
            Precondition::leaf(DirExists::staging()),
            Precondition::leaf(DirIsWritable::staging()),
        ],
    )
}

/// Configuration-dependent leaves.
struct Wiring<'a> {
    config: &'a Config,
    runner: Arc<dyn ProcessRunner>,
}

impl Wiring<'_> {
    fn common(&self) -> Precondition {
        let mut children = vec![
            active_dir_is_ready(),
            Precondition::leaf(ExecutableIsAvailable::package_manager(
                self.config.package_manager_executable(),
                self.config.package_manager_version_args(),
                Arc::clone(&self.runner),
            )),
        ];
        if self.config.syncer_kind() == SyncerKind::Rsync {
            children.push(Precondition::leaf(ExecutableIsAvailable::rsync(
                self.config.rsync_executable(),
                Arc::clone(&self.runner),
            )));
        }
        children.push(Precondition::leaf(ActiveAndStagingDirsAreDifferent));
        children.push(Precondition::leaf(StagingDirIsNotNested));

        tree(
            "CommonPreconditions",
            "The preconditions common to all operations.",
            "The preconditions for all operations are fulfilled.",
            children,
        )
    }

    fn no_unsupported_links(&self) -> Precondition {
        tree(
            "NoUnsupportedLinksExist",
            "The codebase cannot contain unsupported links.",
            "There are no unsupported links in the codebase.",
            vec![
                Precondition::leaf(NoAbsoluteSymlinksExist),
                Precondition::leaf(NoHardLinksExist),
                Precondition::leaf(NoLinksExistOnWindows::new()),
                Precondition::leaf(NoSymlinksPointOutsideTheCodebase),
                Precondition::leaf(NoSymlinksPointToADirectory::new(
                    self.config.syncer_kind(),
                )),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::path::StagePath;
    use crate::precondition::CheckContext;
    use crate::process::{OutputSink, ProcessSpec};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Answers every version query successfully without spawning anything.
    #[derive(Debug)]
    struct AlwaysOk;

    impl ProcessRunner for AlwaysOk {
        fn run(
            &self,
            _spec: &ProcessSpec,
            _sink: Option<&mut dyn OutputSink>,
            _timeout: Option<Duration>,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn catalogue(config: &Config) -> PreconditionCatalogue {
        PreconditionCatalogue::new(config, Arc::new(AlwaysOk))
    }

    fn cargo_config(syncer: SyncerKind) -> Config {
        Config {
            syncer: Some(syncer),
            package_manager: Some(crate::config::PackageManagerConfig {
                executable: "cargo".into(),
                version_args: vec!["--version".into()],
            }),
            ..Default::default()
        }
    }

    fn leaf_names(precondition: &Precondition) -> Vec<String> {
        precondition
            .leaves()
            .iter()
            .map(|leaf| leaf.name().to_string())
            .collect()
    }

    #[test]
    fn test_operation_names() {
        let names: Vec<String> = Operation::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["begin", "stage", "commit", "clean"]);
    }

    #[test]
    fn test_begin_leaves_in_order() {
        let catalogue = catalogue(&Config::default());
        assert_eq!(
            leaf_names(catalogue.begin()),
            vec![
                "ActiveDirExists",
                "ActiveDirIsWritable",
                "PackageManagerIsAvailable",
                "ActiveAndStagingDirsAreDifferent",
                "StagingDirIsNotNested",
                "StagingDirDoesNotExist",
                "NoAbsoluteSymlinksExist",
                "NoHardLinksExist",
                "NoLinksExistOnWindows",
                "NoSymlinksPointOutsideTheCodebase",
                "NoSymlinksPointToADirectory",
            ]
        );
    }

    #[test]
    fn test_rsync_backend_adds_tool_check() {
        let native = catalogue(&Config::default());
        let rsync = catalogue(&Config {
            syncer: Some(SyncerKind::Rsync),
            ..Default::default()
        });
        for operation in Operation::ALL {
            assert!(!leaf_names(native.for_operation(operation)).contains(&"RsyncIsAvailable".into()));
            assert!(leaf_names(rsync.for_operation(operation)).contains(&"RsyncIsAvailable".into()));
        }
    }

    #[test]
    fn test_stage_and_clean_share_shape() {
        let catalogue = catalogue(&Config::default());
        assert_eq!(leaf_names(catalogue.stage()), leaf_names(catalogue.clean()));
        assert!(leaf_names(catalogue.stage()).contains(&"StagingDirIsWritable".into()));
        assert!(!leaf_names(catalogue.stage()).contains(&"NoHardLinksExist".into()));
        assert!(leaf_names(catalogue.commit()).contains(&"NoHardLinksExist".into()));
    }

    #[test]
    fn test_trees_evaluate_against_real_dirs() {
        let root = TempDir::new().unwrap();
        let active_dir = root.path().join("active");
        let staging_dir = root.path().join("staging");
        fs::create_dir(&active_dir).unwrap();
        fs::write(active_dir.join("index.php"), "<?php").unwrap();

        let active = StagePath::new(active_dir.to_string_lossy()).unwrap();
        let staging = StagePath::new(staging_dir.to_string_lossy()).unwrap();
        let ctx = CheckContext::new(&active, &staging);
        let catalogue = catalogue(&cargo_config(SyncerKind::Native));

        assert!(catalogue.begin().is_fulfilled(&ctx).unwrap());
        let err = catalogue.stage().assert_is_fulfilled(&ctx).unwrap_err();
        match err {
            crate::Error::PreconditionUnfulfilled {
                precondition, leaf, ..
            } => {
                assert_eq!(precondition, "StagerPreconditions");
                assert_eq!(leaf, "StagingDirExists");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        fs::create_dir(&staging_dir).unwrap();
        assert!(!catalogue.begin().is_fulfilled(&ctx).unwrap());
        assert!(catalogue.stage().is_fulfilled(&ctx).unwrap());
        assert!(catalogue.commit().is_fulfilled(&ctx).unwrap());
        assert!(catalogue.clean().is_fulfilled(&ctx).unwrap());
    }
}
