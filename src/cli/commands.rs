//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::services::{BuiltTree, EntityRequest};
use crate::cli::args::{Cli, Commands, ConfigCommands, KindCommands, TreeCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Submission, TreeKind, Version};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command against the wired services.
pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Kind { command }) => kind_command(command, container),
        Some(Commands::Tree { command }) => tree_command(command, container),
        Some(Commands::Decide {
            file,
            kind,
            tree_version,
            batch,
            full,
        }) => decide(
            container,
            file,
            kind.as_deref(),
            tree_version.as_deref(),
            *batch,
            *full || container.settings.full_result,
        ),
        Some(Commands::Config { command }) => config_command(command, cli, container),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn read_json<T: DeserializeOwned>(container: &ServiceContainer, file: &Path) -> CliResult<T> {
    let content = container
        .fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    Ok(serde_json::from_str(&content)
        .map_err(|e| InfraError::json(file.display().to_string(), e))?)
}

fn resolve_kind(container: &ServiceContainer, kind: Option<&str>) -> CliResult<TreeKind> {
    Ok(container
        .trees
        .resolve_kind(kind, container.settings.default_kind.as_deref())?)
}

fn kind_command(command: &KindCommands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        KindCommands::Add { name, description } => {
            let kind = container.trees.add_kind(name, description)?;
            output::success(&format!("added kind {} ({})", kind.name, kind.id));
        }
        KindCommands::List => {
            let kinds = container.trees.kinds()?;
            if kinds.is_empty() {
                output::warning("no tree kinds defined");
            }
            for kind in kinds {
                output::info(&format!("{}\t{}\t{}", kind.id, kind.name, kind.description));
            }
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn tree_command(command: &TreeCommands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        TreeCommands::Submit { file, kind } => {
            let kind = resolve_kind(container, kind.as_deref())?;
            let submission: Submission = read_json(container, file)?;
            let built = container.trees.submit(&kind.name, &submission)?;
            output::success(&format!(
                "stored tree {} as {}",
                built.tree.id,
                built.version_display()
            ));
            output::detail(&format!("root: {}", built.tree.root));
            output::detail(&format!(
                "{} nodes, {} leafs",
                built.nodes.len(),
                built.leafs.len()
            ));
        }
        TreeCommands::Show {
            kind,
            tree_version,
            json,
        } => {
            let kind = resolve_kind(container, kind.as_deref())?;
            let built = container
                .trees
                .complete_tree(&kind.name, tree_version.as_deref())?;
            if *json {
                output::info(&tree_json(&built)?);
            } else {
                output::header(&built.version_display());
                output::info(&built.index()?.to_tree_string());
            }
        }
        TreeCommands::Versions { kind } => {
            let kind = resolve_kind(container, kind.as_deref())?;
            output::header(&kind.name);
            for entry in container.trees.versions(&kind.name)? {
                let tree = match &entry.tree {
                    Some(tree) => format!("tree {} by {}", tree, tree.created_by),
                    None => "no tree".to_string(),
                };
                output::detail(&format!("{}\t{}", entry.version.label(), tree));
            }
        }
        TreeCommands::AddVersion { label, kind } => {
            let kind = resolve_kind(container, kind.as_deref())?;
            let (major, minor) = Version::parse_label(label).ok_or_else(|| {
                CliError::InvalidArgs(format!("version must be major.minor: {label}"))
            })?;
            let version = container.trees.create_version(&kind.name, major, minor)?;
            output::success(&format!("added version {}", version.display_with(&kind)));
        }
        TreeCommands::Purge { label, kind } => {
            let kind = resolve_kind(container, kind.as_deref())?;
            let removed = container
                .trees
                .delete_version_elements(&kind.name, label)?;
            output::action(
                "Removed",
                &format!("{removed} elements of {}: {label}", kind.name),
            );
        }
    }
    Ok(())
}

fn tree_json(built: &BuiltTree) -> CliResult<String> {
    let value = serde_json::json!({
        "kind": built.kind,
        "version": built.version,
        "tree": built.tree,
        "nodes": built.nodes,
        "leafs": built.leafs,
    });
    Ok(serde_json::to_string_pretty(&value).map_err(|e| InfraError::json("tree output", e))?)
}

#[instrument(level = "debug", skip(container))]
fn decide(
    container: &ServiceContainer,
    file: &Path,
    kind: Option<&str>,
    version: Option<&str>,
    batch: bool,
    full: bool,
) -> CliResult<()> {
    let kind = resolve_kind(container, kind)?;
    let value = if batch {
        let requests: Vec<EntityRequest> = read_json(container, file)?;
        let results = container
            .decisions
            .decide_batch(&kind.name, version, &requests)?;
        debug!("decided {} entities", results.len());
        serde_json::Value::Array(results.iter().map(|r| r.to_json(full)).collect())
    } else {
        let request: EntityRequest = read_json(container, file)?;
        container
            .decisions
            .decide(&kind.name, version, &request)?
            .to_json(full)
    };
    let rendered =
        serde_json::to_string_pretty(&value).map_err(|e| InfraError::json("decision output", e))?;
    output::info(&rendered);
    Ok(())
}

fn config_command(
    command: &ConfigCommands,
    cli: &Cli,
    container: &ServiceContainer,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("no global config directory"),
            }
            if let Some(dir) = &cli.dir {
                output::action("Local", &local_config_path(dir).display());
            }
            output::action("Store", &container.settings.store_path().display());
        }
    }
    Ok(())
}
