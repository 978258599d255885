use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser, Subcommand};
use client_core::{
    config::load_settings, HttpStudyResource, LinePrompter, Outcome, Prompter, Selection,
    StudyController, StudyResource,
};
use shared::domain::Study;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse and edit studies on a studies backend")]
struct Cli {
    /// Overrides the configured backend, e.g. http://127.0.0.1:9000
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print all studies with their indices
    List,
    /// Fetch and print the study at INDEX
    Get { index: usize },
    /// Prompt for a name and description and create a study
    Add,
    /// Prompt for new values for the study at INDEX
    Update { index: usize },
    /// Delete the study at INDEX
    Remove { index: usize },
    /// Interactive session; type `help` for commands, `quit` to leave
    Shell,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

type StdioPrompter = LinePrompter<std::io::StdinLock<'static>, std::io::Stdout>;
type Controller<R> = StudyController<R, StdioPrompter>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref());
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }

    let resource = HttpStudyResource::with_timeout(&settings.server_url, settings.request_timeout())
        .with_context(|| {
            format!("failed to set up studies client for {}", settings.server_url)
        })?;
    info!(server_url = %settings.server_url, "using studies backend");

    let mut controller = StudyController::new(resource, LinePrompter::stdio());
    match cli.command {
        Command::Shell => run_shell(&mut controller).await,
        command => {
            if needs_fresh_list(&command) {
                controller
                    .list(None)
                    .await
                    .context("failed to list studies")?;
            }
            run_command(&mut controller, command).await
        }
    }
}

// Indices on the command line refer to a freshly listed collection; `list`
// fetches on its own.
fn needs_fresh_list(command: &Command) -> bool {
    !matches!(command, Command::List | Command::Shell)
}

async fn run_shell<R: StudyResource>(controller: &mut Controller<R>) -> Result<()> {
    if let Err(err) = controller.list(None).await {
        eprintln!("error: {err}");
    } else {
        print_studies(controller.studies(), controller.selected());
    }

    loop {
        let Some(line) = controller.prompter_mut().prompt("studies", None)? else {
            return Ok(());
        };
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => return Ok(()),
            _ => {}
        }

        let command = match ShellLine::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed.command,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp) => {
                println!("{}", err.render());
                continue;
            }
            Err(err) => {
                eprintln!("{}", err.render());
                continue;
            }
        };
        if matches!(command, Command::Shell) {
            println!("already in a shell");
            continue;
        }

        if let Err(err) = run_command(controller, command).await {
            eprintln!("error: {err:#}");
        }
    }
}

async fn run_command<R: StudyResource>(
    controller: &mut Controller<R>,
    command: Command,
) -> Result<()> {
    match command {
        Command::List => {
            controller.list(None).await.context("failed to list studies")?;
            print_studies(controller.studies(), controller.selected());
        }
        Command::Get { index } => {
            controller
                .get(index)
                .await
                .with_context(|| format!("failed to fetch study {index}"))?;
            if let Some(selection) = controller.selected() {
                print_selection(selection);
            }
        }
        Command::Add => {
            let outcome = controller.add().await.context("failed to add study")?;
            report(outcome, controller.studies(), controller.selected());
        }
        Command::Update { index } => {
            let outcome = controller
                .update(index)
                .await
                .with_context(|| format!("failed to update study {index}"))?;
            report(outcome, controller.studies(), controller.selected());
        }
        Command::Remove { index } => {
            controller
                .remove(index)
                .await
                .with_context(|| format!("failed to remove study {index}"))?;
            print_studies(controller.studies(), controller.selected());
        }
        Command::Shell => {}
    }
    Ok(())
}

fn report(outcome: Outcome, studies: &[Study], selected: Option<&Selection>) {
    match outcome {
        Outcome::Applied => print_studies(studies, selected),
        Outcome::Cancelled => println!("cancelled"),
    }
}

fn print_studies(studies: &[Study], selected: Option<&Selection>) {
    if studies.is_empty() {
        println!("(no studies)");
        return;
    }
    let selected_idx = selected.map(|selection| selection.idx);
    for (idx, study) in studies.iter().enumerate() {
        let marker = if selected_idx == Some(idx) { '*' } else { ' ' };
        println!("{marker} [{idx}] {} - {}", study.studyname, study.description);
    }
}

fn print_selection(selection: &Selection) {
    let study = &selection.study;
    println!("[{}] {}", selection.idx, study.studyname);
    if let Some(id) = &study.id {
        println!("  id:          {id}");
    }
    println!("  description: {}", study.description);
    if !study.createdby.is_empty() {
        println!("  created by:  {}", study.createdby);
    }
    for level in &study.levels {
        let values: Vec<&str> = level
            .values
            .iter()
            .map(|value| value.valuename.as_str())
            .collect();
        println!(
            "  level {} {}: {}",
            level.levelorder,
            level.levelname,
            values.join(", ")
        );
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
