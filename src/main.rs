use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use fastwarp_dtw::{Alignment, DtwError, FastDtw, Metric, SequenceView};
use fastwarp_io::{PairCost, ResultWriter, RunName, RunSettings, SequenceReader, SeriesTableReader};

#[derive(Parser)]
#[command(name = "fastwarp")]
#[command(about = "Approximate dynamic time warping in linear time (FastDTW)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for pairwise computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared alignment parameters.
#[derive(Args, Debug, Clone)]
struct AlignArgs {
    /// FastDTW neighbourhood radius; larger is slower and more accurate
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    radius: i64,

    /// Element distance: "manhattan" or "pnorm"
    #[arg(long, default_value = "manhattan")]
    metric: String,

    /// Order of the p-norm when --metric pnorm is used ("inf" for max norm)
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    order: f64,

    /// Run exact DTW over the full grid instead of FastDTW
    #[arg(long, default_value_t = false)]
    exact: bool,
}

/// Where to write the JSON artifact, if anywhere.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Output directory for result files (no artifact is written if unset)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long, default_value = "fastwarp")]
    run: String,
}

#[derive(Subcommand)]
enum Command {
    /// Align two sequences and report the cost and warping path
    Align {
        /// CSV file with one element of the first sequence per row
        #[arg(long)]
        x: PathBuf,

        /// CSV file with one element of the second sequence per row
        #[arg(long)]
        y: PathBuf,

        #[command(flatten)]
        align: AlignArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compute alignment costs for every pair of series in a table
    Pairwise {
        /// CSV file with header `id,t0,t1,...` and one series per row
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        align: AlignArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct AlignOutput {
    cost: f64,
    len_x: usize,
    len_y: usize,
    path_len: usize,
    path: Vec<(usize, usize)>,
}

#[derive(Serialize)]
struct PairwiseOutput {
    n_series: usize,
    n_pairs: usize,
    min_cost: Option<f64>,
    max_cost: Option<f64>,
}

/// Resolved alignment configuration.
struct Aligner {
    fast: FastDtw,
    exact: bool,
    metric_label: String,
}

impl Aligner {
    fn from_args(args: &AlignArgs) -> Result<Self> {
        let (metric, metric_label) = parse_metric(&args.metric, args.order)?;
        let fast = FastDtw::new(args.radius)?.with_metric(metric);
        Ok(Self {
            fast,
            exact: args.exact,
            metric_label,
        })
    }

    fn align(&self, x: SequenceView<'_>, y: SequenceView<'_>) -> Result<Alignment, DtwError> {
        if self.exact {
            self.fast.exact(x, y)
        } else {
            self.fast.align(x, y)
        }
    }

    fn settings(&self) -> RunSettings<'_> {
        RunSettings {
            radius: (!self.exact).then(|| self.fast.radius()),
            metric: &self.metric_label,
        }
    }
}

fn parse_metric(name: &str, order: f64) -> Result<(Metric, String)> {
    match name {
        "manhattan" => Ok((Metric::Manhattan, "manhattan".to_string())),
        "pnorm" => Ok((Metric::p_norm(order)?, format!("pnorm({order})"))),
        other => anyhow::bail!("unknown metric: {other} (expected manhattan or pnorm)"),
    }
}

fn writer_for(output: &OutputArgs) -> Result<Option<ResultWriter>> {
    let Some(dir) = &output.output_dir else {
        return Ok(None);
    };
    let run = RunName::new(output.run.clone())?;
    Ok(Some(ResultWriter::new(dir, run)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Align {
            x,
            y,
            align,
            output,
        } => {
            let aligner = Aligner::from_args(&align)?;

            let x = SequenceReader::new(&x)
                .read()
                .context("failed to read first sequence")?;
            let y = SequenceReader::new(&y)
                .read()
                .context("failed to read second sequence")?;

            let alignment = aligner
                .align(x.as_view(), y.as_view())
                .context("alignment failed")?;
            info!(
                cost = %alignment.cost,
                path_len = alignment.path.len(),
                "alignment complete"
            );

            if let Some(writer) = writer_for(&output)? {
                writer.write_alignment(x.len(), y.len(), aligner.settings(), &alignment)?;
            }

            let out = AlignOutput {
                cost: alignment.cost.value(),
                len_x: x.len(),
                len_y: y.len(),
                path_len: alignment.path.len(),
                path: alignment.path.to_pairs(),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }

        Command::Pairwise {
            data,
            align,
            output,
        } => {
            let aligner = Aligner::from_args(&align)?;

            let table = SeriesTableReader::new(&data)
                .read()
                .context("failed to read series table")?;

            // Pairs are independent, so spread them over the pool.
            let n = table.len();
            let index_pairs: Vec<(usize, usize)> =
                (1..n).flat_map(|i| (0..i).map(move |j| (i, j))).collect();
            let pairs = index_pairs
                .into_par_iter()
                .map(|(i, j)| {
                    let a = table.series[i].as_view();
                    let b = table.series[j].as_view();
                    aligner.align(a, b).map(|al| PairCost {
                        i,
                        j,
                        cost: al.cost.value(),
                    })
                })
                .collect::<Result<Vec<_>, DtwError>>()
                .context("pairwise alignment failed")?;
            info!(n_series = n, n_pairs = pairs.len(), "pairwise alignment complete");

            if let Some(writer) = writer_for(&output)? {
                writer.write_pairwise(&table.ids, aligner.settings(), &pairs)?;
            }

            let costs = pairs.iter().map(|p| p.cost);
            let out = PairwiseOutput {
                n_series: n,
                n_pairs: pairs.len(),
                min_cost: costs.clone().reduce(f64::min),
                max_cost: costs.reduce(f64::max),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
