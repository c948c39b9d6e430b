//! `sharedlib check`: validate a configuration without resolving filesets.

use std::path::PathBuf;

use clap::Args;
use sharedlib::config::LibraryConfigFile;
use sharedlib::content::PathResolver;

use super::common::load_config;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Library configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: PathBuf,
}

/// Run the check subcommand.
pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let file = load_config(&args.config)?;
    let problems = find_problems(&file);

    let snapshot = &file.snapshot;
    println!("Library: {}", snapshot.id());
    println!("  File refs:    {}", snapshot.file_refs().len());
    println!("  Folder refs:  {}", snapshot.folder_refs().len());
    println!("  Fileset refs: {}", snapshot.fileset_refs().len());
    println!("  API visibility: {}", snapshot.api_visibility());

    if problems.is_empty() {
        println!("OK");
        return Ok(());
    }

    println!();
    for problem in &problems {
        println!("  - {}", problem);
    }
    Err(CliError::CheckFailed(problems.len()))
}

/// References that would be dropped or never resolve.
fn find_problems(file: &LibraryConfigFile) -> Vec<String> {
    let snapshot = &file.snapshot;
    let mut problems = Vec::new();

    for r in snapshot.file_refs() {
        if file.paths.resolve_file(r).is_none() {
            problems.push(match file.paths.file_path(r) {
                Some(path) => format!("file '{}' is not a file: {}", r, path.display()),
                None => format!("file '{}' has no [file.{}] section", r, r),
            });
        }
    }

    for r in snapshot.folder_refs() {
        if file.paths.resolve_folder(r).is_none() {
            problems.push(match file.paths.folder_path(r) {
                Some(path) => format!("folder '{}' is not a directory: {}", r, path.display()),
                None => format!("folder '{}' has no [folder.{}] section", r, r),
            });
        }
    }

    for r in file.undefined_filesets() {
        problems.push(format!("fileset '{}' has no [fileset.{}] section", r, r));
    }

    for (id, definition) in &file.filesets {
        if !definition.dir().is_dir() {
            problems.push(format!(
                "fileset '{}' directory does not exist: {}",
                id,
                definition.dir().display()
            ));
        }
    }

    problems
}
