use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{parse_path, EditSession};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{format_path, to_tree_string_with_paths, Address, TreeModel, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::infrastructure::traits::FixedChooser;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match &cli.command {
        Some(Commands::New { file, force }) => _new(&container, file, *force),
        Some(Commands::Show { file, paths }) => _show(&container, file, *paths),
        Some(Commands::Normalize { file, output }) => {
            _normalize(&container, file, output.as_deref())
        }
        Some(Commands::Set { file, path, value }) => _set(&container, file, path, value),
        Some(Commands::InsertRow { file, path }) => _insert_row(&container, file, path),
        Some(Commands::InsertChild { file, path }) => {
            _insert_child(&container, file, path.as_deref())
        }
        Some(Commands::RemoveRow { file, path }) => _remove_row(&container, file, path),
        Some(Commands::Move {
            file,
            paths,
            to,
            row,
        }) => _move(&container, file, paths, to.as_deref(), *row),
        Some(Commands::Config) => _config(&container, cli.config.as_deref()),
        Some(Commands::Completion { .. }) | None => Ok(()),
    }
}

fn open_session(container: &ServiceContainer, file: &Path) -> CliResult<EditSession> {
    let mut model = TreeModel::new(container.settings.model_options());
    let chooser = FixedChooser::new(file);
    if !container.documents.open(&chooser, &mut model)? {
        return Err(ApplicationError::EmptyDocument(file.to_path_buf()).into());
    }
    Ok(EditSession::new(model))
}

fn save_model(container: &ServiceContainer, model: &TreeModel, file: &Path) -> CliResult<PathBuf> {
    let chooser = FixedChooser::new(file);
    container
        .documents
        .save(&chooser, model)?
        .ok_or_else(|| CliError::Usage("save cancelled".into()))
}

fn select(session: &mut EditSession, path: &str) -> CliResult<Address> {
    let rows = parse_path(path)?;
    if rows.is_empty() {
        return Err(CliError::InvalidArgs(format!("not an item path: '{}'", path)));
    }
    Ok(session.select_path(&rows)?)
}

fn current_label(session: &EditSession) -> String {
    session
        .current_path()
        .map(|p| format_path(&p))
        .unwrap_or_default()
}

#[instrument(skip(container))]
fn _new(container: &ServiceContainer, file: &Path, force: bool) -> CliResult<()> {
    let target = container.documents.with_extension(file);
    if container.fs.exists(&target) && !force {
        return Err(CliError::Usage(format!(
            "{} exists, use --force to overwrite",
            target.display()
        )));
    }
    let model = container
        .documents
        .default_document(container.settings.model_options());
    let written = save_model(container, &model, file)?;
    output::action("Created", &written.display());
    Ok(())
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, file: &Path, paths: bool) -> CliResult<()> {
    let session = open_session(container, file)?;
    let tree = if paths {
        to_tree_string_with_paths(session.model())
    } else {
        session.model().to_tree_string()
    };
    output::info(&tree);
    Ok(())
}

#[instrument(skip(container))]
fn _normalize(container: &ServiceContainer, file: &Path, target: Option<&Path>) -> CliResult<()> {
    let session = open_session(container, file)?;
    match target {
        Some(target) => {
            let written = save_model(container, session.model(), target)?;
            output::action("Written", &written.display());
        }
        None => io::stdout()
            .write_all(session.model().to_text().as_bytes())
            .map_err(|e| InfraError::io("write to stdout", e))?,
    }
    Ok(())
}

#[instrument(skip(container))]
fn _set(container: &ServiceContainer, file: &Path, path: &str, value: &str) -> CliResult<()> {
    let mut session = open_session(container, file)?;
    select(&mut session, path)?;
    session.set_value(value)?;
    let written = save_model(container, session.model(), file)?;
    output::success(&format!("[{}] set to '{}' in {}", path, value, written.display()));
    Ok(())
}

#[instrument(skip(container))]
fn _insert_row(container: &ServiceContainer, file: &Path, path: &str) -> CliResult<()> {
    let mut session = open_session(container, file)?;
    select(&mut session, path)?;
    session.insert_row()?;
    let written = save_model(container, session.model(), file)?;
    output::success(&format!(
        "inserted [{}] in {}",
        current_label(&session),
        written.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _insert_child(container: &ServiceContainer, file: &Path, path: Option<&str>) -> CliResult<()> {
    let mut session = open_session(container, file)?;
    let rows = path.map(parse_path).transpose()?.unwrap_or_default();
    session.select_path(&rows)?;
    session.insert_child()?;
    let written = save_model(container, session.model(), file)?;
    output::success(&format!(
        "inserted [{}] in {}",
        current_label(&session),
        written.display()
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _remove_row(container: &ServiceContainer, file: &Path, path: &str) -> CliResult<()> {
    let mut session = open_session(container, file)?;
    select(&mut session, path)?;
    session.remove_row()?;
    let written = save_model(container, session.model(), file)?;
    output::success(&format!("removed [{}] from {}", path, written.display()));
    Ok(())
}

#[instrument(skip(container))]
fn _move(
    container: &ServiceContainer,
    file: &Path,
    paths: &[String],
    to: Option<&str>,
    row: Option<usize>,
) -> CliResult<()> {
    let mut session = open_session(container, file)?;
    let model = session.model();

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let rows = parse_path(path)?;
        let address = model.index_for_path(&rows);
        if !address.is_valid() {
            return Err(ApplicationError::NoSuchNode(path.clone()).into());
        }
        sources.push(address);
    }
    let parent_rows = to.map(parse_path).transpose()?.unwrap_or_default();
    let parent = model.index_for_path(&parent_rows);
    if !parent_rows.is_empty() && !parent.is_valid() {
        return Err(ApplicationError::NoSuchNode(format_path(&parent_rows)).into());
    }
    debug!(sources = sources.len(), %parent, ?row, "moving");

    session.move_rows(&sources, &parent, row)?;
    let written = save_model(container, session.model(), file)?;
    output::success(&format!("moved {} item(s) in {}", sources.len(), written.display()));
    Ok(())
}

fn _config(container: &ServiceContainer, config_file: Option<&Path>) -> CliResult<()> {
    let source = config_file.map(Path::to_path_buf).or_else(global_config_path);
    match source.filter(|p| p.exists()) {
        Some(path) => output::header(&format!("# {}", path.display())),
        None => output::warning("no config file found, showing defaults"),
    }
    output::info(&container.settings.to_toml()?);
    Ok(())
}
