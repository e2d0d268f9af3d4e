//! Subcommands of the `easel` binary.
//!
//! Tool states are opaque to the command line, so every command works on
//! `serde_json::Value` data.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use easel_config::EaselConfig;
use easel_store::{PresetLibrary, PresetUpdate, Project, ProjectSession, StoreContext};
use serde_json::Value;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage a tool's presets.
    Presets {
        /// Tool the presets belong to, e.g. `cell-mosaic`.
        #[arg(long)]
        tool: String,

        #[command(subcommand)]
        action: PresetCommand,
    },
    /// Manage a tool's saved projects.
    Projects {
        /// Tool the projects belong to, e.g. `cell-mosaic`.
        #[arg(long)]
        tool: String,

        #[command(subcommand)]
        action: ProjectCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// List the user presets.
    List,
    /// Write the user presets to a file, or to stdout.
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append the presets in a file to the user presets.
    Import { file: PathBuf },
    /// Delete a user preset.
    Delete { id: String },
    /// Rename a user preset.
    Rename { id: String, name: String },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List recently saved projects, most recent first.
    Recent,
    /// Print a saved project.
    Show { id: String },
    /// Write a saved project to a file.
    Export {
        id: String,

        /// Defaults to a file named after the project in the working directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a project file and save it under a new id.
    Import { file: PathBuf },
    /// Rename a saved project.
    Rename { id: String, name: String },
}

pub fn run(
    ctx: &StoreContext,
    config: &EaselConfig,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Presets { tool, action } => {
            let library = PresetLibrary::<Value>::open(ctx.clone(), tool, Vec::new())?;
            run_presets(library, action, out)
        }
        Command::Projects { tool, action } => {
            let session = ProjectSession::<Value>::new(ctx.clone(), tool)
                .with_max_recent(config.max_recent_projects);
            run_projects(session, action, out)
        }
    }
}

fn run_presets(
    mut library: PresetLibrary<Value>,
    action: PresetCommand,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        PresetCommand::List => {
            if library.is_empty() {
                writeln!(out, "No presets for {}", library.tool_name())?;
            }
            for preset in library.presets() {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    preset.id,
                    preset.name,
                    preset.updated_at.format(TIME_FORMAT)
                )?;
            }
        }
        PresetCommand::Export { output } => {
            let blob = library.export_presets()?;
            match output {
                Some(path) => {
                    write_file(&path, &blob)?;
                    let count = library.user_presets().len();
                    writeln!(out, "Exported {count} preset(s) to {}", path.display())?;
                }
                None => writeln!(out, "{blob}")?,
            }
        }
        PresetCommand::Import { file } => {
            let count = library.import_presets(&read_file(&file)?)?;
            writeln!(out, "Imported {count} preset(s)")?;
        }
        PresetCommand::Delete { id } => {
            if !library.delete_preset(&id)? {
                bail!("No preset {id} for {}", library.tool_name());
            }
            writeln!(out, "Deleted preset {id}")?;
        }
        PresetCommand::Rename { id, name } => {
            if !library.update_preset(&id, PresetUpdate::rename(&name))? {
                bail!("No preset {id} for {}", library.tool_name());
            }
            writeln!(out, "Renamed preset {id} to {name}")?;
        }
    }
    Ok(())
}

fn run_projects(
    mut session: ProjectSession<Value>,
    action: ProjectCommand,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        ProjectCommand::Recent => {
            let recent = session.recent_projects()?;
            if recent.is_empty() {
                writeln!(out, "No recent projects for {}", session.tool_name())?;
            }
            for entry in recent {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    entry.id,
                    entry.name,
                    entry.updated_at.format(TIME_FORMAT)
                )?;
            }
        }
        ProjectCommand::Show { id } => {
            let project = load(&mut session, &id)?;
            writeln!(out, "{} ({})", project.name, project.id)?;
            writeln!(out, "tool:    {}", project.tool_name)?;
            writeln!(out, "created: {}", project.created_at.format(TIME_FORMAT))?;
            writeln!(out, "updated: {}", project.updated_at.format(TIME_FORMAT))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&project.data)?)?;
        }
        ProjectCommand::Export { id, output } => {
            load(&mut session, &id)?;
            let (Some(blob), Some(file_name)) =
                (session.export_to_file()?, session.export_file_name())
            else {
                bail!("No active project to export");
            };
            let path = output.unwrap_or_else(|| PathBuf::from(file_name));
            write_file(&path, &blob)?;
            writeln!(out, "Exported project {id} to {}", path.display())?;
        }
        ProjectCommand::Import { file } => {
            let id = session.import_from_file(&read_file(&file)?)?.id.clone();
            session.save()?;
            writeln!(out, "Imported project as {id}")?;
        }
        ProjectCommand::Rename { id, name } => {
            load(&mut session, &id)?;
            session.rename(name.as_str());
            session.save()?;
            writeln!(out, "Renamed project {id} to {name}")?;
        }
    }
    Ok(())
}

fn load<'a>(session: &'a mut ProjectSession<Value>, id: &str) -> Result<&'a Project<Value>> {
    let tool = session.tool_name().to_string();
    session
        .load(id)?
        .with_context(|| format!("No project {id} for {tool}"))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
