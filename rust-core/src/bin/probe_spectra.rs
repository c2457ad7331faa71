//! probe-spectra: spectra of probe time series from the command line
//!
//! Loads a whitespace-delimited probe table, cuts a time window, and writes
//! PSD, frequency-weighted PSD, cross-PSD magnitude or coherence as a
//! two-column table.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use cfd_spectra::io::{write_columns, write_columns_to, ProbeTable};
use cfd_spectra::signal::{Outcome, Signal};
use cfd_spectra::spectrum::{
    CrossForm, EstimatorConfig, Method, SpectralEstimate, SpectralEstimator, WindowType,
};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Analysis {
    Psd,
    FwPsd,
    CrossPsd,
    Coherence,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Direct,
    Welch,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Direct => Method::DirectFft,
            MethodArg::Welch => Method::Welch,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "probe-spectra", version, about = "Spectral analysis of probe time series")]
struct Args {
    /// Probe table with a header line naming the columns
    input: PathBuf,

    /// Quantity to compute
    #[arg(short, long, value_enum, default_value = "fw-psd")]
    analysis: Analysis,

    /// Column to analyse
    #[arg(short, long)]
    var: String,

    /// Second column for cross-psd and coherence
    #[arg(long)]
    with: Option<String>,

    /// Column holding the sample times
    #[arg(long, default_value = "time")]
    time: String,

    /// Analysis sampling frequency
    #[arg(long, default_value_t = 50.0)]
    fs: f64,

    /// Start of the time window
    #[arg(long)]
    t_start: Option<f64>,

    /// End of the time window
    #[arg(long)]
    t_end: Option<f64>,

    /// Drop rows with repeated time stamps, first kept
    #[arg(long)]
    dedup: bool,

    #[arg(short, long, value_enum, default_value = "direct")]
    method: MethodArg,

    /// Welch window: hann, hamming, blackman or rectangular
    #[arg(long, default_value = "hann")]
    window: String,

    /// Welch segment length in samples
    #[arg(long)]
    segment: Option<usize>,

    /// Welch segment overlap in samples
    #[arg(long)]
    overlap: Option<usize>,

    /// Use the raw X_a * X_b direct cross spectrum
    #[arg(long)]
    unconjugated: bool,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn estimator_config(&self) -> Result<EstimatorConfig, Box<dyn Error>> {
        let window = WindowType::from_name(&self.window)
            .ok_or_else(|| format!("unknown window '{}'", self.window))?;

        let mut config = EstimatorConfig::with_method(self.method.into());
        config.welch.window = window;
        config.welch.segment_len = self.segment;
        config.welch.overlap = self.overlap;
        if self.unconjugated {
            config.cross_form = CrossForm::Unconjugated;
        }
        Ok(config)
    }

    fn second_var(&self) -> Result<&str, Box<dyn Error>> {
        self.with
            .as_deref()
            .ok_or_else(|| format!("--with is required for {:?}", self.analysis).into())
    }
}

fn report<T>(outcome: Outcome<T>) -> T {
    let (value, warning) = outcome.into_parts();
    if let Some(warning) = warning {
        log::warn!("{}", warning);
    }
    value
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut table = ProbeTable::load(&args.input)?;
    if args.dedup {
        table = table.dedup_by(&args.time)?;
    }
    let start = args.t_start.unwrap_or(f64::NEG_INFINITY);
    let end = args.t_end.unwrap_or(f64::INFINITY);
    let table = table.time_window(&args.time, start, end)?;
    log::info!(
        "{} snapshots of '{}' in [{}, {}]",
        table.n_rows(),
        args.var,
        start,
        end
    );

    let time = table.column_vec(&args.time)?;
    let x = table.column_vec(&args.var)?;
    let signal = Signal::timestamped(&x, &time);
    let mut estimator = SpectralEstimator::new(args.estimator_config()?);

    let (header, estimate): ([&str; 2], SpectralEstimate) = match args.analysis {
        Analysis::Psd => (["Freq", "PSD"], report(estimator.psd(&signal, args.fs)?)),
        Analysis::FwPsd => (
            ["Freq", "FWPSD"],
            report(estimator.frequency_weighted_psd(&signal, args.fs)?),
        ),
        Analysis::CrossPsd => {
            let y = table.column_vec(args.second_var()?)?;
            let other = Signal::timestamped(&y, &time);
            let cross = report(estimator.cross_psd(&signal, &other, args.fs)?);
            let power = cross.magnitude();
            (
                ["Freq", "CrossPSD"],
                SpectralEstimate {
                    frequency: cross.frequency,
                    power,
                },
            )
        }
        Analysis::Coherence => {
            let y = table.column_vec(args.second_var()?)?;
            let other = Signal::timestamped(&y, &time);
            (
                ["Freq", "Coherence"],
                report(estimator.coherence(&signal, &other, args.fs)?),
            )
        }
    };

    if let Some((f, p)) = estimate.peak() {
        log::info!("Peak {:.6e} at {:.4} Hz over {} bins", p, f, estimate.len());
    }

    let columns: [&[f64]; 2] = [&estimate.frequency, &estimate.power];
    match &args.output {
        Some(path) => write_columns(path, &header, &columns)?,
        None => write_columns_to(&mut io::stdout().lock(), &header, &columns)?,
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
