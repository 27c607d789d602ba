//! grapheus - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use semver::Version;
use tracing_subscriber::EnvFilter;

use grapheus::commit::{CommitGenerator, GeneratedCommit, MessageStyle, ValidationResult};
use grapheus::config::Config;
use grapheus::git::{DiffSource, GitCli, TagRepository, WorkingTree};
use grapheus::llm::{CommandExecutor, RateLimitedExecutor};
use grapheus::version::{
    BumpType, PreReleaseKind, ReleasePlan, ReleasePlanner, SemanticVersion, TaggingOptions,
    validate_repository_state,
};

/// Write commit messages and version tags from git diffs using a generative model.
#[derive(Parser, Debug)]
#[command(name = "grapheus")]
#[command(about = "Write commit messages and version tags from git diffs using a generative model")]
#[command(version)]
struct Cli {
    /// Show debug logs on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a commit message for the current changes
    Commit(CommitArgs),
    /// Recommend the next version from the changes since the latest tag and tag it
    Version(VersionArgs),
    /// Print the local analysis of the current changes as JSON, without calling the model
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct CommitArgs {
    /// Describe unstaged changes instead of the index
    #[arg(long)]
    unstaged: bool,

    /// Message style: conventional, simple or detailed
    #[arg(long)]
    style: Option<MessageStyle>,

    /// Create the commit with the generated message
    #[arg(long)]
    commit: bool,

    /// Skip the confirmation prompt before committing
    #[arg(short, long)]
    yes: bool,

    /// Print the message, validation and analysis as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct VersionArgs {
    /// Force a bump type instead of the model's recommendation
    #[arg(long)]
    bump: Option<BumpType>,

    /// Release as a pre-release: alpha, beta or rc
    #[arg(long)]
    pre: Option<PreReleaseKind>,

    /// Explicit version to tag (skips the model)
    #[arg(long = "set-version")]
    set_version: Option<Version>,

    /// Tag annotation message (defaults to "Release X.Y.Z")
    #[arg(short, long)]
    message: Option<String>,

    /// Create a lightweight tag instead of an annotated one
    #[arg(long)]
    lightweight: bool,

    /// Show the plan without creating the tag
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Describe unstaged changes instead of the index
    #[arg(long)]
    unstaged: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries the message or JSON
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let tree = WorkingTree::discover(".")
        .context("Not a git repository. Run grapheus from within a git repository.")?;
    let workdir = tree
        .workdir()
        .map(Path::to_path_buf)
        .context("Bare repositories are not supported")?;

    let config = Config::load(&workdir).context("Failed to load configuration")?;

    match cli.command {
        Command::Commit(args) => run_commit(args, &config, &tree, workdir).await,
        Command::Version(args) => run_version(args, &config, workdir).await,
        Command::Analyze(args) => run_analyze(args, &config, &tree, workdir),
    }
}

async fn run_commit(args: CommitArgs, config: &Config, tree: &WorkingTree, workdir: PathBuf) -> Result<()> {
    // Step 1: Collect the diff
    let diff_text = tree
        .diff_text(diff_source(config, args.unstaged))
        .context("Failed to collect diff")?;

    // Step 2: Generate the message
    let git = GitCli::new(workdir);
    let style = args.style.unwrap_or(config.output.style);
    let generator = build_generator(config, &git, checked_model(config)?, style);

    eprintln!("Generating commit message...");
    let generated = generator
        .generate(&diff_text)
        .await
        .context("Failed to generate commit message")?;

    // Step 3: Report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&generated)?);
    } else {
        println!("{}", generated.formatted);
        print_validation(&generated.validation);
    }

    // Step 4: Commit if asked
    if args.commit {
        commit_generated(&git, &generated, args.yes)?;
    }

    Ok(())
}

fn run_analyze(args: AnalyzeArgs, config: &Config, tree: &WorkingTree, workdir: PathBuf) -> Result<()> {
    let diff_text = tree
        .diff_text(diff_source(config, args.unstaged))
        .context("Failed to collect diff")?;

    let git = GitCli::new(workdir);
    let generator = build_generator(config, &git, model(config), config.output.style);
    let prepared = generator.prepare(&diff_text).context("Failed to analyze changes")?;

    println!("{}", serde_json::to_string_pretty(&prepared)?);
    Ok(())
}

async fn run_version(args: VersionArgs, config: &Config, workdir: PathBuf) -> Result<()> {
    let git = GitCli::new(workdir);

    // Step 1: Refuse early on a dirty tree, before paying for a model call
    if !args.dry_run {
        let state = git.repository_state().context("Failed to read repository state")?;
        validate_repository_state(state)?;
    }

    // Step 2: Plan the release
    let version_override = args
        .set_version
        .map(SemanticVersion::try_from)
        .transpose()
        .context("Unsupported --set-version value")?;

    let options = TaggingOptions {
        force_bump: args.bump,
        pre_release: args.pre,
        message: args.message,
        annotated: !args.lightweight,
        dry_run: args.dry_run,
        version_override,
    };

    let executor = match options.version_override {
        Some(_) => model(config),
        None => {
            eprintln!("Analyzing changes since the latest tag...");
            checked_model(config)?
        }
    };
    let planner = ReleasePlanner::new(&git, executor).with_processor(config.processor());
    let plan = planner.plan(&options).await.context("Failed to plan release")?;
    print_plan(&plan);

    // Step 3: Tag
    if args.dry_run {
        println!("\nDry run: no tag created.");
        return Ok(());
    }

    if !args.yes && !confirm(&format!("Create tag {}?", plan.tag_name))? {
        println!("Cancelled.");
        return Ok(());
    }

    planner.tag(&plan, &options).context("Failed to create tag")?;
    println!("✓ Created tag {}", plan.tag_name);
    Ok(())
}

fn diff_source(config: &Config, unstaged: bool) -> DiffSource {
    if unstaged || !config.diff.staged {
        DiffSource::Unstaged
    } else {
        DiffSource::Staged
    }
}

type Model = RateLimitedExecutor<CommandExecutor>;

fn model(config: &Config) -> Model {
    RateLimitedExecutor::new(config.executor(), config.rate_limiter())
}

/// The configured model, after checking its program is on `PATH`.
fn checked_model(config: &Config) -> Result<Model> {
    let model = model(config);
    model
        .inner()
        .check_installed()
        .context("A model command is required (set model.command or GRAPHEUS_MODEL_COMMAND)")?;
    Ok(model)
}

fn build_generator<'a>(
    config: &Config,
    git: &'a GitCli,
    model: Model,
    style: MessageStyle,
) -> CommitGenerator<&'a GitCli, Model> {
    CommitGenerator::new(git, model)
        .with_processor(config.processor())
        .with_scope_detector(config.scope_detector())
        .with_formatter(config.formatter())
        .with_validator(config.validator())
        .with_style(style)
}

fn commit_generated(git: &GitCli, generated: &GeneratedCommit, skip_confirm: bool) -> Result<()> {
    if !generated.validation.is_valid {
        bail!("Refusing to commit a message that failed validation");
    }
    if !skip_confirm && !confirm("Commit with this message?")? {
        println!("Cancelled.");
        return Ok(());
    }
    git.commit(&generated.formatted).context("Failed to create commit")?;
    println!("✓ Committed");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .context("Confirmation prompt failed")
}

/// Validation findings go to stderr, after the message.
fn print_validation(result: &ValidationResult) {
    for error in &result.errors {
        eprintln!("error: {}", error.message);
    }
    for warning in &result.warnings {
        match (warning.line, &warning.suggestion) {
            (Some(line), _) => eprintln!("warning (line {}): {}", line, warning.message),
            (None, Some(suggestion)) => eprintln!("warning: {} ({})", warning.message, suggestion),
            (None, None) => eprintln!("warning: {}", warning.message),
        }
    }
    for suggestion in &result.suggestions {
        eprintln!("suggestion: {} -> {}", suggestion.message, suggestion.suggested);
    }
}

fn print_plan(plan: &ReleasePlan) {
    println!(
        "Version: {} -> {}",
        plan.previous_tag.as_deref().unwrap_or("none"),
        plan.next
    );
    if let Some(analysis) = &plan.analysis {
        println!(
            "Recommended bump: {} (confidence {:.0}%)",
            analysis.recommended_bump,
            analysis.confidence * 100.0
        );
        if !analysis.reasoning.is_empty() {
            println!("Reasoning: {}", analysis.reasoning);
        }
        for (label, items) in [
            ("Breaking changes", &analysis.breaking_changes),
            ("New features", &analysis.new_features),
            ("Bug fixes", &analysis.bug_fixes),
        ] {
            if !items.is_empty() {
                println!("{label}:");
                for item in items {
                    println!("  - {item}");
                }
            }
        }
    }
    println!(
        "Tag: {} ({})",
        plan.tag_name,
        if plan.annotated { "annotated" } else { "lightweight" }
    );
}
