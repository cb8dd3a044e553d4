mod report;
mod settings;
mod upload_worker;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use vidscribe_core::intake::intake_use_case::IntakeUseCase;
use vidscribe_core::naming::domain::naming_strategy::NamingStrategy;
use vidscribe_core::naming::infrastructure::resolver_factory::create_resolver;
use vidscribe_core::processing::domain::transcriber::Transcriber;
use vidscribe_core::processing::infrastructure::command_transcriber::CommandTranscriber;
use vidscribe_core::processing::infrastructure::placeholder_transcriber::PlaceholderTranscriber;
use vidscribe_core::storage::directory_namespace::DirectoryNamespace;
use vidscribe_core::storage::storage_writer::StorageWriter;

use settings::{Settings, SettingsError};
use upload_worker::{run_uploads, UploadSource};

const STDIN_INPUT: &str = "-";

/// Store uploaded videos under collision-free names and transcribe them.
#[derive(Parser)]
#[command(name = "vidscribe")]
struct Cli {
    /// Video files to upload ("-" reads one upload from stdin).
    inputs: Vec<PathBuf>,

    /// Directory uploads are stored in.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Naming strategy for colliding names: sequential or random.
    #[arg(long)]
    naming: Option<String>,

    /// Settings file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of uploads processed in parallel.
    #[arg(long)]
    jobs: Option<usize>,

    /// Store only; skip transcription.
    #[arg(long)]
    no_transcribe: bool,

    /// External transcriber program. The stored file's path is appended to
    /// its arguments.
    #[arg(long)]
    transcriber: Option<String>,

    /// Argument passed to the transcriber program (repeatable, kept verbatim).
    #[arg(long = "transcriber-arg", allow_hyphen_values = true, requires = "transcriber")]
    transcriber_args: Vec<String>,

    /// Reject uploads larger than this many bytes.
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Declared filename for the upload read from stdin.
    #[arg(long)]
    stdin_name: Option<String>,

    /// List stored uploads and exit.
    #[arg(long)]
    list: bool,

    /// Write the effective settings back to the settings file.
    #[arg(long)]
    save_config: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = effective_settings(&cli)?;
    if cli.save_config {
        save_settings(&settings, cli.config.as_deref())?;
        if cli.inputs.is_empty() && !cli.list {
            return Ok(());
        }
    }

    let namespace = Arc::new(DirectoryNamespace::open(&settings.storage_dir)?);
    if cli.list {
        for name in namespace.stored_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    let use_case = Arc::new(IntakeUseCase::new(
        namespace,
        create_resolver(settings.naming_strategy),
        build_writer(&settings),
        build_transcriber(&settings)?,
    ));
    let sources = to_sources(&cli);
    let total = sources.len();

    let reports = run_uploads(use_case, sources, settings.jobs);
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }

    // A missing report counts as a failure too.
    let failed = reports.iter().filter(|r| !r.is_success()).count()
        + total.saturating_sub(reports.len());
    if failed > 0 {
        return Err(format!("{failed} of {total} uploads failed").into());
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(ref naming) = cli.naming {
        naming.parse::<NamingStrategy>()?;
    }
    if cli.jobs == Some(0) {
        return Err("Jobs must be at least 1".into());
    }
    if cli.no_transcribe && cli.transcriber.is_some() {
        return Err("--no-transcribe and --transcriber are mutually exclusive".into());
    }
    if cli.list {
        return Ok(());
    }
    if cli.inputs.is_empty() && !cli.save_config {
        return Err("At least one input file is required unless --list or --save-config is used".into());
    }
    let stdin_inputs = cli.inputs.iter().filter(|p| is_stdin(p)).count();
    if stdin_inputs > 1 {
        return Err(format!("\"{STDIN_INPUT}\" may be given only once").into());
    }
    if stdin_inputs == 1 && cli.stdin_name.is_none() {
        return Err(format!("--stdin-name is required when reading from \"{STDIN_INPUT}\"").into());
    }
    Ok(())
}

/// Defaults, then the settings file, then command-line flags.
fn effective_settings(cli: &Cli) -> Result<Settings, SettingsError> {
    let base = match cli.config {
        Some(ref path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    Ok(effective_settings_from(cli, base))
}

fn effective_settings_from(cli: &Cli, mut settings: Settings) -> Settings {
    if let Some(ref dir) = cli.storage_dir {
        settings.storage_dir = dir.clone();
    }
    if let Some(strategy) = cli.naming.as_deref().and_then(|n| n.parse().ok()) {
        settings.naming_strategy = strategy;
    }
    if let Some(jobs) = cli.jobs {
        settings.jobs = jobs;
    }
    if cli.no_transcribe {
        settings.transcribe = false;
    }
    if let Some(ref program) = cli.transcriber {
        settings.transcribe = true;
        settings.transcriber_command = Some(
            std::iter::once(program.clone())
                .chain(cli.transcriber_args.iter().cloned())
                .collect(),
        );
    }
    if let Some(limit) = cli.max_bytes {
        settings.max_upload_bytes = Some(limit);
    }
    settings
}

fn save_settings(settings: &Settings, explicit: Option<&Path>) -> Result<(), SettingsError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Settings::default_path().ok_or(SettingsError::NoConfigDir)?,
    };
    settings.save_to(&path)?;
    log::info!("Saved settings to {}", path.display());
    Ok(())
}

fn build_writer(settings: &Settings) -> StorageWriter {
    let mut writer = StorageWriter::new()
        .with_buffer_size(settings.copy_buffer_size)
        .with_progress(Box::new(|name, bytes| {
            log::debug!("{name}: {bytes} bytes written");
        }));
    if let Some(limit) = settings.max_upload_bytes {
        writer = writer.with_max_bytes(limit);
    }
    writer
}

fn build_transcriber(
    settings: &Settings,
) -> Result<Option<Box<dyn Transcriber>>, Box<dyn std::error::Error>> {
    if !settings.transcribe {
        log::info!("Transcription disabled");
        return Ok(None);
    }
    match settings.transcriber_command {
        Some(ref command) => {
            let transcriber = CommandTranscriber::from_command_line(command)?;
            log::info!("Transcribing with {}", transcriber.program());
            Ok(Some(Box::new(transcriber)))
        }
        None => Ok(Some(Box::new(PlaceholderTranscriber::new()))),
    }
}

fn to_sources(cli: &Cli) -> Vec<UploadSource> {
    cli.inputs
        .iter()
        .map(|path| match cli.stdin_name {
            Some(ref name) if is_stdin(path) => UploadSource::Stdin {
                declared_name: name.clone(),
            },
            _ => UploadSource::File(path.clone()),
        })
        .collect()
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_INPUT
}
