//! Property-based tests for configuration system.

use super::merger::ConfigMerger;
use super::schema::Config;
use super::validator::ConfigValidator;
use crate::sync::SyncerKind;
use proptest::prelude::*;

fn syncer_strategy() -> impl Strategy<Value = SyncerKind> {
    prop_oneof![Just(SyncerKind::Native), Just(SyncerKind::Rsync)]
}

fn exclusion_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(/[a-z]{1,8}){0,2}/?"
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        prop::option::of("/[a-z]{1,12}"),
        prop::option::of("[a-z]{1,12}"),
        prop::option::of(prop::collection::vec(exclusion_strategy(), 0..4)),
        prop::option::of(syncer_strategy()),
        prop::option::of(0u64..10_000),
    )
        .prop_map(
            |(active_dir, staging_dir, exclusions, syncer, timeout_seconds)| Config {
                active_dir,
                staging_dir,
                exclusions,
                syncer,
                timeout_seconds,
                ..Default::default()
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // Configuration merging preserves non-None values from higher precedence
    #[test]
    fn config_merge_higher_precedence_wins(low in config_strategy(), high in config_strategy()) {
        let mut merged = low.clone();
        ConfigMerger::merge_into(&mut merged, &high);

        prop_assert_eq!(&merged.staging_dir, if high.staging_dir.is_some() { &high.staging_dir } else { &low.staging_dir });
        prop_assert_eq!(merged.syncer, high.syncer.or(low.syncer));
        prop_assert_eq!(merged.timeout_seconds, high.timeout_seconds.or(low.timeout_seconds));
    }

    // Exclusions from every layer survive the merge
    #[test]
    fn config_merge_accumulates_exclusions(low in config_strategy(), high in config_strategy()) {
        let mut merged = low.clone();
        ConfigMerger::merge_into(&mut merged, &high);

        let set = merged.exclusion_set();
        for exclusion in low.exclusions.iter().chain(high.exclusions.iter()).flatten() {
            prop_assert!(set.contains(exclusion), "{} lost in merge", exclusion);
        }
    }

    // Merging with an empty config is the identity
    #[test]
    fn config_merge_empty_is_identity(config in config_strategy()) {
        let mut merged = config.clone();
        ConfigMerger::merge_into(&mut merged, &Config::default());
        prop_assert_eq!(merged, config);
    }

    // Generated configs contain only relative, contained exclusions
    #[test]
    fn config_generated_configs_validate(config in config_strategy()) {
        prop_assert!(ConfigValidator::validate(&config).is_ok());
    }

    // Prefixing any exclusion with enough `..` segments makes it invalid
    #[test]
    fn config_escaping_exclusion_rejected(exclusion in exclusion_strategy()) {
        let depth = exclusion.trim_end_matches('/').split('/').count();
        let escaping = format!("{}{exclusion}", "../".repeat(depth + 1));
        let config = Config { exclusions: Some(vec![escaping]), ..Default::default() };
        prop_assert!(ConfigValidator::validate(&config).is_err());
    }
}
