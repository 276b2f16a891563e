use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pagefield_layout::ExportFidelity;
use pagefield_runtime::{Editor, EditorConfig, logging};
use tracing::info;

use crate::error::{ReplayError, Result};
use crate::script::{ReplaySummary, Script, replay};

#[derive(Debug, Parser)]
#[command(
    name = "pagefield-replay",
    about = "Replay PageField gesture scripts and emit layout documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a script and write the layout document.
    Run(RunArgs),

    /// Load and validate an editor config file.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Gesture script (JSON).
    pub script: PathBuf,

    /// Editor config (TOML, or JSON by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the document here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Include per-field settings in the export.
    #[arg(long)]
    pub full: bool,

    /// Fail when any step changed nothing.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CheckConfigArgs {
    pub config: PathBuf,

    /// Print the effective config as TOML.
    #[arg(long)]
    pub print: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_replay(&args).map(|_| ()),
        Commands::CheckConfig(args) => check_config(&args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig> {
    match path {
        Some(path) => Ok(EditorConfig::load(path)?),
        None => Ok(EditorConfig::default()),
    }
}

/// Replay `args.script` and write the resulting document.
pub fn run_replay(args: &RunArgs) -> Result<ReplaySummary> {
    let config = load_config(args.config.as_ref())?;
    logging::init(&config.logging)?;

    let script = Script::load(&args.script)?;
    let mut editor = Editor::new(&config);
    let summary = replay(&mut editor, &script)?;
    info!(
        target: "pagefield.replay",
        script = %args.script.display(),
        applied = summary.applied,
        ignored = summary.ignored.len(),
        "replay finished"
    );

    let mut exporter = editor.exporter();
    if args.full {
        exporter = exporter.with_fidelity(ExportFidelity::Full);
    }
    let document = editor.export_with(exporter);
    let pretty = config.export.pretty;
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            document.write_json(&mut out, pretty)?;
            out.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            document.write_json(stdout.lock(), pretty)?;
        }
    }

    if args.strict && !summary.ignored.is_empty() {
        return Err(ReplayError::StepsIgnored {
            count: summary.ignored.len(),
        });
    }
    Ok(summary)
}

fn check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = EditorConfig::load(&args.config)?;
    if args.print {
        print!("{}", config.to_toml_string()?);
    } else {
        println!("{}: ok", args.config.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn check_config_reports_validation_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[zoom]\nmin_scale = 0.0\n").unwrap();
        let err = run(Cli {
            command: Commands::CheckConfig(CheckConfigArgs {
                config: path,
                print: false,
            }),
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_script_is_an_io_failure() {
        let dir = tempdir().unwrap();
        let err = run_replay(&RunArgs {
            script: dir.path().join("nope.json"),
            config: None,
            output: Some(dir.path().join("out.json")),
            full: false,
            strict: false,
        })
        .unwrap_err();
        assert!(matches!(err, ReplayError::ScriptRead { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "pagefield-replay",
            "run",
            "s.json",
            "--output",
            "o.json",
            "--full",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.script, PathBuf::from("s.json"));
        assert_eq!(args.output, Some(PathBuf::from("o.json")));
        assert!(args.full);
        assert!(!args.strict);
    }
}
