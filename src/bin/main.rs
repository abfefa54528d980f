//! RSSK Command Line Interface
//!
//! Computes gap-weighted subsequence kernels of sequence files and writes
//! them in LibSVM precomputed kernel format or as JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rssk::api::StringKernelBuilder;
use rssk::core::{KernelError, KernelFloat, Result, SymbolEncoding};
use rssk::data::{default_labels, write_kernel, write_kernel_file, SequenceFile, SequenceFormat};
use rssk::kernel::{MatchMode, SubstitutionMatrix};
use rssk::persistence::SerializableKernel;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rssk")]
#[command(about = "Gap-weighted subsequence string kernels")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "RSSK Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the kernel matrix of a sequence file
    Compute(ComputeArgs),
    /// Similarity of two sequences
    Pairwise(PairwiseArgs),
    /// Display information about a saved JSON kernel
    Info(InfoArgs),
}

/// Kernel parameters shared by `compute` and `pairwise`
#[derive(Args)]
struct KernelArgs {
    /// Smallest subsequence length
    #[arg(long, default_value = "1")]
    min_kn: usize,

    /// Largest subsequence length
    #[arg(long, default_value = "2")]
    max_kn: usize,

    /// Gap decay factor in (0, 1]
    #[arg(short, long, default_value = "0.5")]
    lambda: f64,

    /// Skip cosine normalization
    #[arg(long)]
    no_normalize: bool,

    /// Alphabet size
    #[arg(long, default_value = "255")]
    symbol_size: usize,

    /// Longest accepted sequence
    #[arg(long, default_value = "1000")]
    max_length: usize,

    /// Worker threads (defaults to all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Text to symbol mapping
    #[arg(long, default_value = "bytes")]
    encoding: CliEncoding,

    /// Substitution table for soft matching of the last symbol (byte encoding only)
    #[arg(long)]
    substitution: Option<PathBuf>,
}

#[derive(Args)]
struct ComputeArgs {
    /// Sequence file
    #[arg(long)]
    data: PathBuf,

    /// Output file (prints LibSVM format to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sequence file format
    #[arg(short, long, default_value = "auto")]
    format: CliSequenceFormat,

    /// Output format
    #[arg(long, default_value = "libsvm")]
    output_format: CliOutputFormat,

    /// Compute in double precision
    #[arg(long)]
    double: bool,

    #[command(flatten)]
    kernel: KernelArgs,
}

#[derive(Args)]
struct PairwiseArgs {
    /// First sequence
    a: String,

    /// Second sequence
    b: String,

    /// Smallest subsequence length
    #[arg(long, default_value = "1")]
    min_kn: usize,

    /// Largest subsequence length
    #[arg(long, default_value = "3")]
    max_kn: usize,

    /// Gap decay factor in (0, 1]
    #[arg(short, long, default_value = "0.1")]
    lambda: f64,

    /// Skip cosine normalization
    #[arg(long)]
    no_normalize: bool,

    /// Also print the 2x2 kernel in LibSVM format
    #[arg(long)]
    matrix: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// JSON kernel file
    kernel: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliSequenceFormat {
    /// Guess from extension and content
    #[value(name = "auto")]
    Auto,
    /// One sequence per line
    #[value(name = "plain")]
    Plain,
    /// Label and sequence per line
    #[value(name = "labeled")]
    Labeled,
    /// FASTA records
    #[value(name = "fasta")]
    Fasta,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliOutputFormat {
    #[value(name = "libsvm")]
    LibSvm,
    #[value(name = "json")]
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliEncoding {
    /// One symbol per UTF-8 byte
    #[value(name = "bytes")]
    Bytes,
    /// Dense indices in order of first appearance
    #[value(name = "compact")]
    Compact,
}

impl From<CliEncoding> for SymbolEncoding {
    fn from(cli_encoding: CliEncoding) -> Self {
        match cli_encoding {
            CliEncoding::Bytes => SymbolEncoding::Bytes,
            CliEncoding::Compact => SymbolEncoding::Compact,
        }
    }
}

impl KernelArgs {
    fn builder(&self) -> Result<StringKernelBuilder> {
        let mut builder = StringKernelBuilder::new()
            .with_lengths(self.min_kn, self.max_kn)
            .with_lambda(self.lambda)
            .with_normalize(!self.no_normalize)
            .with_symbol_size(self.symbol_size)
            .with_max_length(self.max_length)
            .with_encoding(self.encoding.into());
        if let Some(threads) = self.threads {
            builder = builder.with_threads(threads);
        }
        if let Some(path) = &self.substitution {
            // Table rows name bytes, compact indices depend on input order
            if matches!(self.encoding, CliEncoding::Compact) {
                return Err(KernelError::InvalidParameter(
                    "--substitution requires --encoding bytes".to_string(),
                ));
            }
            info!("Loading substitution table from: {path:?}");
            let matrix = SubstitutionMatrix::from_file(path, self.symbol_size)?;
            builder = builder.with_matching(MatchMode::soft(matrix));
        }
        Ok(builder)
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Compute(args) => compute_command(args),
        Commands::Pairwise(args) => pairwise_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn compute_command(args: ComputeArgs) -> Result<()> {
    info!("Data file: {:?}", args.data);

    let format = match args.format {
        CliSequenceFormat::Auto => SequenceFormat::detect(&args.data)?,
        CliSequenceFormat::Plain => SequenceFormat::Plain,
        CliSequenceFormat::Labeled => SequenceFormat::Labeled,
        CliSequenceFormat::Fasta => SequenceFormat::Fasta,
    };
    info!("Loading sequences as {format:?} format");

    let file = SequenceFile::from_file(&args.data, format)?;
    info!("Loaded {} sequences", file.len());

    if args.double {
        compute_with::<f64>(&args, &file)
    } else {
        compute_with::<f32>(&args, &file)
    }
}

fn compute_with<T: KernelFloat>(args: &ComputeArgs, file: &SequenceFile) -> Result<()> {
    let builder = args.kernel.builder()?;
    let config = builder.config().clone();
    info!(
        "Parameters: lengths={}..={}, lambda={}, normalize={}, soft={}",
        config.min_kn,
        config.max_kn,
        config.lambda,
        config.normalize,
        !config.matching.is_hard()
    );

    let kernel = builder.compute::<T, _>(file.sequences())?;
    let labels = file
        .labels()
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| default_labels(file.len()));

    match (args.output_format, &args.output) {
        (CliOutputFormat::LibSvm, Some(path)) => {
            write_kernel_file(path, &labels, &kernel)?;
            info!("Kernel saved to: {path:?}");
        }
        (CliOutputFormat::LibSvm, None) => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_kernel(&mut writer, &labels, &kernel)?;
        }
        (CliOutputFormat::Json, Some(path)) => {
            let serializable = SerializableKernel::from_kernel(labels, &kernel, &config)?;
            serializable.save_to_file(path)?;
            info!("Kernel saved to: {path:?}");
        }
        (CliOutputFormat::Json, None) => {
            return Err(KernelError::InvalidParameter(
                "JSON output requires --output".to_string(),
            ));
        }
    }

    Ok(())
}

fn pairwise_command(args: PairwiseArgs) -> Result<()> {
    let builder = StringKernelBuilder::new()
        .with_lengths(args.min_kn, args.max_kn)
        .with_lambda(args.lambda)
        .with_normalize(!args.no_normalize);

    let kernel = builder.compute::<f64, _>(&[args.a.as_str(), args.b.as_str()])?;
    println!("{}", kernel.get(0, 1));

    if args.matrix {
        let labels = vec!["-1".to_string(); 2];
        let stdout = io::stdout();
        let mut writer = BufWriter::new(stdout.lock());
        write_kernel(&mut writer, &labels, &kernel)?;
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading kernel from: {:?}", args.kernel);
    let kernel = SerializableKernel::load_from_file(&args.kernel)?;
    kernel.print_summary();
    Ok(())
}
