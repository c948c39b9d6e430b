//! Common helpers shared across CLI commands.

use std::path::Path;

use serde::Serialize;
use sharedlib::config::LibraryConfigFile;
use sharedlib::content::{Container, ContainerKind, Fileset};
use sharedlib::generation::{Generation, GenerationId};
use sharedlib::ApiVisibility;
use tracing::debug;

use crate::error::CliError;

/// Load a library config file, reporting where it came from.
pub fn load_config(path: &Path) -> Result<LibraryConfigFile, CliError> {
    let file = LibraryConfigFile::load(path)?;
    debug!(
        path = %path.display(),
        library = file.snapshot.id(),
        filesets = file.filesets.len(),
        "Loaded library configuration"
    );
    Ok(file)
}

/// Short label for a container kind.
pub fn kind_label(kind: ContainerKind) -> &'static str {
    match kind {
        ContainerKind::Directory => "dir",
        ContainerKind::Archive => "archive",
        ContainerKind::File => "file",
    }
}

/// Everything `show` prints about a published generation.
#[derive(Debug, Serialize)]
pub struct LibraryReport {
    pub library_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub generation: GenerationId,
    pub api_visibility: ApiVisibility,
    pub files: Vec<String>,
    pub folders: Vec<String>,
    pub filesets: Vec<Fileset>,
    pub containers: Vec<Container>,
}

impl LibraryReport {
    pub fn from_generation(generation: &Generation) -> Self {
        let snapshot = generation.snapshot();
        Self {
            library_id: snapshot.id().to_string(),
            name: snapshot.name().map(str::to_string),
            description: snapshot.description().map(str::to_string),
            generation: generation.id(),
            api_visibility: snapshot.api_visibility().clone(),
            files: generation.files().iter().map(|p| p.display().to_string()).collect(),
            folders: generation.folders().iter().map(|p| p.display().to_string()).collect(),
            filesets: generation.filesets(),
            containers: generation.containers(),
        }
    }

    pub fn print(&self) {
        match &self.name {
            Some(name) => println!("Library: {} ({})", self.library_id, name),
            None => println!("Library: {}", self.library_id),
        }
        if let Some(description) = &self.description {
            println!("  {}", description);
        }
        println!("Generation:     {}", self.generation);
        println!("API visibility: {}", self.api_visibility);

        println!();
        println!("Files ({}):", self.files.len());
        for file in &self.files {
            println!("  {}", file);
        }

        println!("Folders ({}):", self.folders.len());
        for folder in &self.folders {
            println!("  {}", folder);
        }

        println!("Filesets ({}):", self.filesets.len());
        for fileset in &self.filesets {
            println!("  {} ({} files)", fileset.ref_id(), fileset.len());
            for file in fileset.files() {
                println!("    {}", file.display());
            }
        }

        println!("Containers ({}):", self.containers.len());
        for container in &self.containers {
            println!("  {:<8} {}", kind_label(container.kind()), container.source().display());
        }
    }
}
