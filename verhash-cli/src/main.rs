use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use verhash_core::progress::LogLevel;
use verhash_core::verify::verify;
use verhash_core::{Event, ManifestGenerator, OutputName, Outcome, RunRequest};

const LOG_ENV: &str = "VERHASH_LOG";

#[derive(Parser)]
#[command(name = "verhash", version, about = "Version file hash generator")]
struct Cli {
    /// Debug-level diagnostics on stderr (overrides VERHASH_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Hash every file under ROOT and write the manifest
    Generate(GenerateArgs),
    /// Re-hash the files listed in MANIFEST under ROOT
    Verify { manifest: PathBuf, root: PathBuf },
}

#[derive(Args)]
struct GenerateArgs {
    root: PathBuf,
    /// Text of the trailing version line
    #[arg(long, required_unless_present = "only_hash")]
    version_name: Option<String>,
    /// Close the manifest with "--NO VERSION--" instead of a version name
    #[arg(long, default_value_t = false)]
    only_hash: bool,
    /// Custom manifest file name (".txt" is appended if missing)
    #[arg(long)]
    name: Option<String>,
    /// Directory to write the manifest into [default: current directory]
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Print every event as a JSON line on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
    /// No progress lines on stderr
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Cmd::Generate(args) => generate(&args),
        Cmd::Verify { manifest, root } => verify_cmd(&manifest, &root),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn request(args: &GenerateArgs) -> RunRequest {
    let mut req = RunRequest::new(&args.root)
        .with_version(args.version_name.clone().unwrap_or_default())
        .with_only_hash(args.only_hash);
    if let Some(dir) = &args.output_dir {
        req = req.with_output_dir(dir);
    }
    if let Some(name) = &args.name {
        req = req.with_output_name(OutputName::Custom(name.clone()));
    }
    req
}

fn generate(args: &GenerateArgs) -> Result<ExitCode> {
    let generator = ManifestGenerator::new();
    let handle = generator.start(&request(args)).context("start manifest run")?;
    // Ctrl-C stops the run at the next file boundary; the partial manifest stays.
    let token = handle.cancel_token();
    ctrlc::set_handler(move || token.cancel()).context("install Ctrl-C handler")?;
    for ev in handle.events().iter() {
        if args.json {
            println!("{}", serde_json::to_string(&ev)?);
        } else {
            render(&ev, args.quiet);
        }
        if ev.is_terminal() {
            break;
        }
    }
    Ok(match handle.wait() {
        Outcome::Completed { .. } => ExitCode::SUCCESS,
        Outcome::Failed { .. } => ExitCode::from(1),
        Outcome::Cancelled { .. } => ExitCode::from(130),
    })
}

fn render(ev: &Event, quiet: bool) {
    match ev {
        Event::Log(m) if m.level == LogLevel::Warn => eprintln!("Warning: {}", m.text),
        Event::Log(m) if !quiet => eprintln!("{}", m.text),
        Event::Success { output, .. } => println!("{}", output.display()),
        Event::Failure { message } => eprintln!("{}", message),
        Event::Cancelled { entries_written } => {
            eprintln!("Cancelled; {} entries written, no version line", entries_written)
        }
        _ => {}
    }
}

fn verify_cmd(manifest: &Path, root: &Path) -> Result<ExitCode> {
    let rep = verify(manifest, root)?;
    for p in &rep.mismatched {
        println!("MISMATCH  {}", p);
    }
    for p in &rep.missing {
        println!("MISSING   {}", p);
    }
    for p in &rep.unreadable {
        println!("UNREADABLE  {}", p);
    }
    for p in &rep.rejected {
        println!("REJECTED  {}", p);
    }
    eprintln!(
        "Version {}: ok={}, mismatched={}, missing={}, unreadable={}, rejected={}",
        rep.version,
        rep.ok,
        rep.mismatched.len(),
        rep.missing.len(),
        rep.unreadable.len(),
        rep.rejected.len()
    );
    if rep.is_clean() {
        println!("OK");
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
