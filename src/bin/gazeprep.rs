use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gazeprep::{
    io::{read_samples, write_feature_set, Artifacts},
    preprocess, PipelineConfig,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Step {
    /// Every output table.
    All,
    /// Cleaned table with time since stimulus onset.
    Clean,
    /// Pupil diameter features.
    Pupil,
    /// AOI dwell segments and first-glance latency.
    Aoi,
}

impl Step {
    fn artifacts(self) -> Artifacts {
        let none = Artifacts {
            aoi_segments: false,
            first_glance: false,
            pupil_features: false,
            cleaned: false,
        };
        match self {
            Step::All => Artifacts::ALL,
            Step::Clean => Artifacts { cleaned: true, ..none },
            Step::Pupil => Artifacts { pupil_features: true, ..none },
            Step::Aoi => Artifacts { aoi_segments: true, first_glance: true, ..none },
        }
    }
}

#[derive(Parser)]
#[command(name = "gazeprep", about = "Eye-tracking preprocessing pipeline")]
struct Args {
    /// YAML configuration file
    #[arg(long)]
    config: PathBuf,

    /// Output directory (overrides `outdir` from the config)
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Which tables to produce
    #[arg(long, value_enum, default_value_t = Step::All)]
    step: Step,
}

fn main() -> ExitCode {
    // Info by default; RUST_LOG overrides.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut cfg = match PipelineConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(outdir) = args.outdir {
        cfg.outdir = outdir;
    }
    if let Err(e) = std::fs::create_dir_all(&cfg.outdir) {
        log::error!("creating output directory {}: {e}", cfg.outdir.display());
        return ExitCode::FAILURE;
    }

    let artifacts = args.step.artifacts();
    let mut failed = 0usize;
    for path in &cfg.files_to_process {
        match process_file(path, &cfg, artifacts) {
            Ok(written) => {
                for p in written {
                    log::info!("Written → {}", p.display());
                }
            }
            Err(e) => {
                failed += 1;
                log::error!("{}: {e:#}", path.display());
            }
        }
    }

    if failed > 0 {
        log::error!("{failed} of {} files failed", cfg.files_to_process.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn process_file(path: &Path, cfg: &PipelineConfig, artifacts: Artifacts) -> Result<Vec<PathBuf>> {
    let raw = read_samples(path, cfg)?;
    log::info!("Loaded {} samples from {}", raw.len(), path.display());

    let features = preprocess(&raw, cfg)?;
    log::info!(
        "{} rows kept, {} trials, {} AOI segments",
        features.cleaned.len(),
        features.trials.len(),
        features.segments.len()
    );

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("no usable file name in {}", path.display()))?;
    write_feature_set(&features, &cfg.outdir, stem, artifacts)
}
