//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{DragOutcome, PlannedMove};
use crate::application::{changeset, PersistState};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::display::ForestDisplay;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, LOCAL_CONFIG_FILE};
use crate::domain::{CategoryId, DragEnd, Forest, ReorderRequest};
use crate::infrastructure::di::ServiceContainer;

pub async fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree) => cmd_tree(&container(cli)?).await,
        Some(Commands::Move {
            dragged,
            target,
            dry_run,
        }) => cmd_move(&container(cli)?, dragged, target.as_deref(), *dry_run).await,
        Some(Commands::Payload) => cmd_payload(&container(cli)?).await,
        Some(Commands::Check) => cmd_check(&container(cli)?).await,
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| CliError::Usage(e.to_string())),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(base_url = %settings.api.base_url, "settings loaded");
    Ok(ServiceContainer::new(settings)?)
}

async fn load_forest(container: &ServiceContainer) -> CliResult<Forest> {
    let mut service = container.reorder_service();
    Ok(service.load().await?.clone())
}

#[instrument(level = "debug", skip_all)]
async fn cmd_tree(container: &ServiceContainer) -> CliResult<()> {
    let forest = load_forest(container).await?;
    output::info(&forest.to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(container))]
async fn cmd_move(
    container: &ServiceContainer,
    dragged: &str,
    target: Option<&str>,
    dry_run: bool,
) -> CliResult<()> {
    let event =
        DragEnd::from_ids(dragged, target).map_err(|e| CliError::InvalidArgs(e.to_string()))?;
    let mut service = container.reorder_service();
    service.load().await?;

    if dry_run {
        match service.plan(&event)? {
            None => output::info("drag ignored, tree unchanged"),
            Some(PlannedMove {
                dragged,
                new_parent,
                forest,
            }) => {
                output::action("Would move", &describe_move(dragged, new_parent));
                output::info(&forest.to_tree_string());
                output::header("Change-set");
                output::info(&to_json(&changeset(&forest))?);
            }
        }
        return Ok(());
    }

    match service.handle_drag_end(&event)? {
        DragOutcome::Ignored => output::info("drag ignored, tree unchanged"),
        DragOutcome::Moved {
            dragged,
            new_parent,
            sync,
        } => {
            output::action("Moved", &describe_move(dragged, new_parent));
            output::info(&service.forest().to_tree_string());
            report_sync(sync.wait().await);
        }
    }
    Ok(())
}

fn describe_move(dragged: CategoryId, new_parent: Option<CategoryId>) -> String {
    match new_parent {
        Some(parent) => format!("#{dragged} under #{parent}"),
        None => format!("#{dragged} to top level"),
    }
}

/// A failed push leaves the local tree in place; report it, don't fail.
fn report_sync(state: PersistState) {
    match state.into_result() {
        Ok(generation) => output::success(&format!("persisted (push #{generation})")),
        Err(e) => output::warning(&e),
    }
}

#[instrument(level = "debug", skip_all)]
async fn cmd_payload(container: &ServiceContainer) -> CliResult<()> {
    let forest = load_forest(container).await?;
    output::info(&to_json(&changeset(&forest))?);
    Ok(())
}

#[instrument(level = "debug", skip_all)]
async fn cmd_check(container: &ServiceContainer) -> CliResult<()> {
    let forest = load_forest(container).await?;
    let sparse = forest.sparse_groups();
    if sparse.is_empty() {
        output::success(&format!(
            "{} categories in {} levels, orders dense",
            forest.len(),
            forest.depth()
        ));
        return Ok(());
    }
    for group in &sparse {
        output::failure(&group_name(*group));
    }
    Err(CliError::Invariant(
        sparse.into_iter().map(group_name).join(", "),
    ))
}

fn group_name(parent: Option<CategoryId>) -> String {
    match parent {
        Some(id) => format!("children of #{id}"),
        None => "top level".to_string(),
    }
}

fn to_json(request: &ReorderRequest) -> CliResult<String> {
    serde_json::to_string_pretty(request).map_err(|e| CliError::Usage(e.to_string()))
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("no config directory for this platform"),
            }
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| LOCAL_CONFIG_FILE.into());
            output::action("Local", &local.display());
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
