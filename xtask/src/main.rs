use anyhow::{anyhow, bail, Context, Result};
use biopeaks::eval::{Benchmark, BenchmarkConfig, Record, RecordSource};
use biopeaks::{detect, DetectConfig};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_FILE: &str = "ECG.tsv";
const DEFAULT_ANNOTATION: &str = "annotation_cs";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("detect") => run_detect(Options::parse(args)?),
        Some("bench") => run_bench(Options::parse(args)?),
        _ => {
            eprintln!("Usage:");
            eprintln!("  cargo run -p xtask -- detect <record.tsv> [--config cfg.json] [--fs 250] [--channel 0]");
            eprintln!("  cargo run -p xtask -- bench <dir> [--config cfg.json] [--fs 250] [--channel 0]");
            eprintln!("        [--annotation annotation_cs] [--tolerance 1] [--runs 100] [--out report.json]");
            Ok(())
        }
    }
}

/// Command-line options shared by both commands.
#[derive(Debug)]
struct Options {
    path: PathBuf,
    config: DetectConfig,
    sampling_rate: f64,
    channel: usize,
    annotation: String,
    tolerance: usize,
    n_runs: usize,
    out: Option<PathBuf>,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut path = None;
        let mut opts = Options {
            path: PathBuf::new(),
            config: DetectConfig::default(),
            sampling_rate: 250.0,
            channel: 0,
            annotation: DEFAULT_ANNOTATION.into(),
            tolerance: 1,
            n_runs: 100,
            out: None,
        };
        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| anyhow!("missing value for {arg}"))
            };
            match arg.as_str() {
                "--config" => opts.config = load_config(Path::new(&value()?))?,
                "--fs" => opts.sampling_rate = value()?.parse().context("parsing --fs")?,
                "--channel" => opts.channel = value()?.parse().context("parsing --channel")?,
                "--annotation" => opts.annotation = value()?,
                "--tolerance" => {
                    opts.tolerance = value()?.parse().context("parsing --tolerance")?
                }
                "--runs" => opts.n_runs = value()?.parse().context("parsing --runs")?,
                "--out" => opts.out = Some(PathBuf::from(value()?)),
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                _ if path.is_none() => path = Some(PathBuf::from(&arg)),
                _ => bail!("unexpected argument {arg}"),
            }
        }
        opts.path = path.ok_or_else(|| anyhow!("missing input path"))?;
        Ok(opts)
    }
}

fn load_config(path: &Path) -> Result<DetectConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// One column of a whitespace separated numeric table.
fn read_channel(path: &Path, channel: usize) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            let field = line.split_whitespace().nth(channel).ok_or_else(|| {
                anyhow!("{}:{}: no column {channel}", path.display(), n + 1)
            })?;
            field
                .parse::<f64>()
                .with_context(|| format!("{}:{}: parsing {field:?}", path.display(), n + 1))
        })
        .collect()
}

/// Sample indices, one per line. Integral floats such as `125.0` are accepted.
fn read_annotation(path: &Path) -> Result<Vec<usize>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    text.split_whitespace()
        .map(|field| {
            let v: f64 = field
                .parse()
                .with_context(|| format!("{}: parsing {field:?}", path.display()))?;
            if !(v.is_finite() && v >= 0.0 && v.fract() == 0.0) {
                bail!("{}: {field:?} is not a sample index", path.display());
            }
            Ok(v as usize)
        })
        .collect()
}

fn run_detect(opts: Options) -> Result<()> {
    let signal = read_channel(&opts.path, opts.channel)?;
    info!(
        "{}: {} samples at {} Hz",
        opts.path.display(),
        signal.len(),
        opts.sampling_rate
    );
    let peaks = detect(&signal, opts.sampling_rate, &opts.config)
        .with_context(|| format!("detecting peaks in {}", opts.path.display()))?;
    info!("{} peaks", peaks.len());
    for p in peaks {
        println!("{p}");
    }
    Ok(())
}

/// A record directory holding `ECG.tsv` and an annotation file.
struct RecordDir {
    dir: PathBuf,
    channel: usize,
    annotation: String,
}

impl RecordSource for RecordDir {
    fn fetch(&self) -> Record {
        info!("fetching {}", self.dir.display());
        let signal = read_channel(&self.dir.join(RECORD_FILE), self.channel)
            .map_err(|e| warn!("{e:#}"))
            .ok();
        let annotation = read_annotation(&self.dir.join(format!("{}.tsv", self.annotation)))
            .map_err(|e| warn!("{e:#}"))
            .ok();
        Record {
            name: self.dir.display().to_string(),
            signal,
            annotation,
        }
    }
}

/// Every directory below `root` (at any depth) that contains a record file.
fn find_records(root: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    if root.join(RECORD_FILE).is_file() {
        found.push(root.to_path_buf());
    }
    let entries =
        fs::read_dir(root).with_context(|| format!("listing {}", root.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("listing {}", root.display()))?
            .path();
        if path.is_dir() {
            find_records(&path, found)?;
        }
    }
    Ok(())
}

fn run_bench(opts: Options) -> Result<()> {
    let mut dirs = Vec::new();
    find_records(&opts.path, &mut dirs)?;
    dirs.sort();
    if dirs.is_empty() {
        bail!("no {RECORD_FILE} found below {}", opts.path.display());
    }
    info!("{} records below {}", dirs.len(), opts.path.display());

    let sources: Vec<RecordDir> = dirs
        .into_iter()
        .map(|dir| RecordDir {
            dir,
            channel: opts.channel,
            annotation: opts.annotation.clone(),
        })
        .collect();

    let config = opts.config;
    let bench = Benchmark::new(
        |signal: &[f64], rate| detect(signal, rate, &config),
        BenchmarkConfig {
            tolerance: opts.tolerance,
            sampling_rate: opts.sampling_rate,
            n_runs: opts.n_runs,
            ..Default::default()
        },
    );
    let report = bench.run(&sources);

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    match opts.out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
