use crate::core::bundler::{serialize, summarize};
use crate::core::selector::Selector;
use crate::domain::models::{
    BundleConfig, DEFAULT_OUTPUT_FILE, IgnoreRules, OutputTarget, RunSummary,
};
use crate::infra::file_system::{BinaryDetector, HeuristicBinaryDetector};
use crate::infra::logger::{print_welcome_message, setup_logger};
use crate::infra::output::create_writer;
use crate::infra::prompt::{AutoPrompter, ConsolePrompter, Prompter};
use crate::infra::tokens::{TiktokenCounter, TokenCounter};
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "build-repo-prompt")]
#[command(about = "Interactively bundle repository files into one XML document", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a directory, choose files level by level and write the bundle
    Bundle {
        #[arg(long, default_value = ".")]
        path: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        output: String,

        /// Print the document instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Repository name recorded in the document; defaults to the directory name
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "")]
        ignore_dirs: String,

        #[arg(long, default_value = "")]
        ignore_suffixes: String,

        #[arg(long, default_value = "")]
        ignore_files: String,

        /// Answer "y" to every prompt
        #[arg(long)]
        yes: bool,
    },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose)?;

    info!("Starting bundle command");
    let config = build_config(&cli.command);
    debug!("Bundle configuration: {:?}", config);

    // Keep the document alone on stdout when it is the destination.
    let mut console = operator_channel(&config.output);
    print_welcome_message(&mut console)?;

    let mut prompter: Box<dyn Prompter> = if config.auto_select {
        Box::new(AutoPrompter)
    } else {
        Box::new(ConsolePrompter::new(
            io::stdin().lock(),
            operator_channel(&config.output),
        ))
    };

    let counter = TiktokenCounter::default();
    generate_bundle(
        &config,
        prompter.as_mut(),
        &counter,
        &HeuristicBinaryDetector,
        &mut console,
    )?;
    Ok(())
}

fn operator_channel(output: &OutputTarget) -> Box<dyn Write> {
    match output {
        OutputTarget::Console => Box::new(io::stderr()),
        OutputTarget::File(_) => Box::new(io::stdout()),
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn build_config(command: &Commands) -> BundleConfig {
    let Commands::Bundle {
        path,
        output,
        stdout,
        name,
        ignore_dirs,
        ignore_suffixes,
        ignore_files,
        yes,
    } = command;
    let root_path = PathBuf::from(path);

    let mut ignore_rules = IgnoreRules::default();
    ignore_rules.extend_directories(split_list(ignore_dirs));
    ignore_rules.extend_suffixes(split_list(ignore_suffixes));
    ignore_rules.extend_file_names(split_list(ignore_files));

    let output_path = PathBuf::from(output);
    if let Some(file_name) = output_path.file_name() {
        ignore_rules.extend_file_names([file_name.to_string_lossy().to_string()]);
    }

    let output = if *stdout {
        OutputTarget::Console
    } else if output_path.is_absolute() {
        OutputTarget::File(output_path)
    } else {
        OutputTarget::File(root_path.join(output_path))
    };

    BundleConfig {
        root_path,
        output,
        repo_name: name.clone(),
        ignore_rules,
        auto_select: *yes,
    }
}

pub fn resolve_repo_name(config: &BundleConfig) -> String {
    if let Some(name) = &config.repo_name {
        return name.clone();
    }
    fs::canonicalize(&config.root_path)
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "repo".to_string())
}

pub fn generate_bundle(
    config: &BundleConfig,
    prompter: &mut dyn Prompter,
    counter: &dyn TokenCounter,
    detector: &dyn BinaryDetector,
    console: &mut dyn Write,
) -> anyhow::Result<RunSummary> {
    let repo_name = resolve_repo_name(config);
    info!(
        "Bundling {} as repository '{}'",
        config.root_path.display(),
        repo_name
    );

    let files = Selector::new(&config.ignore_rules, prompter, counter, detector, console)
        .traverse(&config.root_path)?;

    let summary = summarize(&files);
    writeln!(console, "\nSummary:")?;
    writeln!(console, "  Total included files: {}", summary.file_count)?;
    writeln!(console, "  Total characters: {}", summary.total_chars)?;
    writeln!(console, "  Total tokens: {}", summary.total_units)?;

    let document = serialize(&repo_name, &files);
    let writer = create_writer(&config.output);
    match writer.write(&document) {
        Ok(()) => writeln!(console, "\nXML output written to '{}'.", writer.destination())?,
        Err(e) => {
            error!("{}", e);
            writeln!(console, "Error writing XML file: {}", e)?;
        }
    }

    Ok(summary)
}
