//! Build script for stager-cli.
//!
//! This script generates a man page at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Flags shared by the operation subcommands.
fn directory_args() -> Vec<Arg> {
    vec![
        Arg::new("active-dir")
            .long("active-dir")
            .help("The live codebase (default: current directory)")
            .value_name("PATH"),
        Arg::new("staging-dir")
            .long("staging-dir")
            .help("The working copy")
            .value_name("PATH"),
        Arg::new("exclude")
            .long("exclude")
            .help("Path, relative to the directories, to leave untouched (repeatable)")
            .value_name("PATH")
            .action(ArgAction::Append),
        Arg::new("timeout")
            .long("timeout")
            .help("Give up after this many seconds (0 means unlimited)")
            .value_name("SECONDS"),
        Arg::new("syncer")
            .long("syncer")
            .help("Synchronizer backend")
            .value_parser(["native", "rsync"]),
    ]
}

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
/// When adding/removing/modifying commands, update both files.
fn build_cli() -> Command {
    Command::new("stager")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Safely stage package manager changes to a live codebase")
        .long_about(
            "Copies a live codebase to a staging directory, runs the package manager there, \
             and synchronizes the result back once it succeeds",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .help("Override the user configuration directory (default: ~/.stager)")
                .value_name("PATH")
                .global(true)
                .env("STAGER_CONFIG_DIR"),
        )
        .subcommands(vec![
            Command::new("begin")
                .about("Copy the active directory to a new staging directory")
                .args(directory_args()),
            Command::new("stage")
                .about("Run a package manager command in the staging directory")
                .args(directory_args())
                .arg(
                    Arg::new("args")
                        .value_name("ARGS")
                        .num_args(1..)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true)
                        .required(true),
                ),
            Command::new("commit")
                .about("Make the staged changes live")
                .args(directory_args()),
            Command::new("clean")
                .about("Remove the staging directory")
                .args(directory_args()),
            Command::new("status")
                .about("Report which operations are ready to run")
                .args(directory_args())
                .arg(
                    Arg::new("operation")
                        .long("operation")
                        .value_parser(["begin", "stage", "commit", "clean"]),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["human", "json"])
                        .default_value("human"),
                ),
            Command::new("validate")
                .about("Validate a configuration file")
                .arg(Arg::new("config-path").value_name("CONFIG_PATH").required(true)),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .required(true),
                ),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(
        std::env::var_os("OUT_DIR").ok_or_else(|| std::io::Error::other("OUT_DIR not set"))?,
    );
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;
    fs::write(man_dir.join("stager.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
