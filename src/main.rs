//! Trending-repository digest pipeline: scrape, enrich, present.
//!
//! Control flow is strictly linear: fetch the trending listings, write the
//! intermediate digest, send it for enrichment, then let the user pick a
//! presentation in an interactive loop. Each stage blocks until complete.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

mod credentials;
mod digest;
mod enrich;
mod render;
mod trending;

use credentials::{CredentialProvider, EnvCredentials, PromptCredentials};
use enrich::EnrichConfig;

#[derive(Parser, Debug)]
#[command(
    name = "rdig",
    version,
    about = "LM-enriched digest of trending GitHub repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch trending repositories, enrich them, and review the result
    Run(RunArgs),
    /// Re-render a previously enriched digest
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Model used for enrichment
    #[arg(long, default_value = enrich::DEFAULT_MODEL)]
    model: String,

    /// Chat-completion endpoint
    #[arg(long, default_value = enrich::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Response length cap
    #[arg(long, default_value_t = enrich::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = enrich::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Directory for digest files
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Enriched digest to render
    #[arg(long)]
    input: PathBuf,

    /// Print to the terminal instead of writing HTML
    #[arg(long)]
    terminal: bool,

    /// Open the rendered HTML in the default viewer
    #[arg(long, conflicts_with = "terminal")]
    open: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Render(args) => cmd_render(args),
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let env_credentials = EnvCredentials::default();
    let providers: [&dyn CredentialProvider; 2] = [&env_credentials, &PromptCredentials];
    let api_key = credentials::resolve_api_key(&providers)?;
    let config = EnrichConfig {
        endpoint: args.endpoint,
        model: args.model,
        api_key,
        max_tokens: args.max_tokens,
        temperature: args.temperature,
    };

    let records = trending::fetch_trending()?;
    let digest_path = digest::write_digest(&records, &args.out_dir)?;
    println!(
        "Saved {} trending repositories to {}",
        records.len(),
        digest_path.display()
    );

    // The enrichment stage reads the intermediate file back so the hand-off
    // stays inspectable on disk.
    let digest_text = fs::read_to_string(&digest_path)
        .with_context(|| format!("read {}", digest_path.display()))?;
    let enriched = enrich::enrich_digest(&config, &digest_text)?;
    let enriched_path = digest::write_enriched(&enriched, &args.out_dir)?;

    let resolved = enriched_path
        .canonicalize()
        .unwrap_or_else(|_| enriched_path.clone());
    println!(
        "Processed digest saved to {}. Containing folder: {}",
        enriched_path.display(),
        resolved.parent().unwrap_or(Path::new(".")).display()
    );

    let stdin = io::stdin();
    run_menus(&mut stdin.lock(), &enriched, &enriched_path)
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    if args.terminal {
        let text = fs::read_to_string(&args.input)
            .with_context(|| format!("read {}", args.input.display()))?;
        let styled = io::stdout().is_terminal();
        let mut stdout = io::stdout().lock();
        return render::render_terminal(&text, &mut stdout, styled);
    }

    let html_path = render::render_html(&args.input)?;
    println!("Wrote {}", html_path.display());
    if args.open {
        open_in_viewer(&html_path)?;
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuState {
    AwaitingRenderChoice,
    AwaitingPostActionChoice,
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuAction {
    RenderHtml,
    RenderTerminal,
    DeleteOutputs,
    Quit,
}

/// Transition table for the interactive loop. `None` means re-prompt
/// without changing state.
fn parse_choice(state: MenuState, input: &str) -> Option<(MenuAction, MenuState)> {
    match (state, input.trim()) {
        (MenuState::AwaitingRenderChoice, "1") => {
            Some((MenuAction::RenderHtml, MenuState::AwaitingPostActionChoice))
        }
        (MenuState::AwaitingRenderChoice, "2") => Some((
            MenuAction::RenderTerminal,
            MenuState::AwaitingPostActionChoice,
        )),
        (MenuState::AwaitingRenderChoice, "0") => Some((MenuAction::Quit, MenuState::Done)),
        (MenuState::AwaitingPostActionChoice, "1") => {
            Some((MenuAction::DeleteOutputs, MenuState::Done))
        }
        (MenuState::AwaitingPostActionChoice, "2") => {
            Some((MenuAction::RenderHtml, MenuState::AwaitingPostActionChoice))
        }
        (MenuState::AwaitingPostActionChoice, "3") => Some((
            MenuAction::RenderTerminal,
            MenuState::AwaitingPostActionChoice,
        )),
        (MenuState::AwaitingPostActionChoice, "0") => Some((MenuAction::Quit, MenuState::Done)),
        _ => None,
    }
}

fn menu_text(state: MenuState) -> &'static str {
    match state {
        MenuState::AwaitingRenderChoice => {
            "\nDigest processed successfully! You can render it as HTML or display it in the terminal.\n\
             1. Render as HTML and open in viewer\n\
             2. Display in terminal\n\
             0. Exit"
        }
        MenuState::AwaitingPostActionChoice => {
            "\nWhat would you like to do now?\n\
             1. Delete the created files\n\
             2. Render as HTML and open in viewer\n\
             3. Display in terminal\n\
             0. Exit"
        }
        MenuState::Done => "",
    }
}

/// Drive the two-stage menu until the user is done. Re-renders reuse the
/// in-memory enriched text and the on-disk file; the remote service is
/// never re-invoked.
fn run_menus(input: &mut impl BufRead, enriched: &str, enriched_path: &Path) -> Result<()> {
    let mut state = MenuState::AwaitingRenderChoice;
    while state != MenuState::Done {
        println!("{}", menu_text(state));
        print!("Enter your choice: ");
        io::stdout().flush().context("flush menu prompt")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("read menu choice")? == 0 {
            break;
        }
        let Some((action, next)) = parse_choice(state, &line) else {
            println!("Invalid choice. Please try again.");
            continue;
        };
        match action {
            MenuAction::RenderHtml => {
                let html_path = render::render_html(enriched_path)?;
                open_in_viewer(&html_path)?;
            }
            MenuAction::RenderTerminal => {
                let styled = io::stdout().is_terminal();
                let mut stdout = io::stdout().lock();
                render::render_terminal(enriched, &mut stdout, styled)?;
            }
            MenuAction::DeleteOutputs => delete_outputs(enriched_path)?,
            MenuAction::Quit => {}
        }
        state = next;
    }
    Ok(())
}

/// Remove the enriched document and its rendered sibling. The intermediate
/// digest is left behind.
fn delete_outputs(enriched_path: &Path) -> Result<()> {
    fs::remove_file(enriched_path)
        .with_context(|| format!("delete {}", enriched_path.display()))?;
    println!("{} has been deleted.", enriched_path.display());
    let html_path = enriched_path.with_extension("html");
    if html_path.exists() {
        fs::remove_file(&html_path)
            .with_context(|| format!("delete {}", html_path.display()))?;
        println!("{} has been deleted.", html_path.display());
    }
    Ok(())
}

/// Hand a rendered file to the host's default opener.
fn open_in_viewer(path: &Path) -> Result<()> {
    viewer_command(path)
        .spawn()
        .with_context(|| format!("open {} in the default viewer", path.display()))?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
