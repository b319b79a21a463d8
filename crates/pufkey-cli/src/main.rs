//! CLI for pufkey — enroll, evaluate and reconstruct SRAM-PUF device keys.

mod commands;
mod serial;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pufkey")]
#[command(about = "pufkey — stable device keys from SRAM power-up noise")]
#[command(version = pufkey_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a device: measure, derive helper data, write it back
    Enroll {
        /// Serial port of the measurement rig
        #[arg(long, default_value = "/dev/ttyUSB0")]
        port: String,

        /// Baud rate of the serial port
        #[arg(long, default_value_t = 115200)]
        baud: u32,

        /// Number of power-cycled measurements for the majority vote
        #[arg(long, default_value_t = 3)]
        repetitions: usize,

        /// Power-off duration per cycle in seconds (SRAM must fully decay)
        #[arg(long, default_value_t = 1.0)]
        off_time: f64,

        /// Secret length in bytes
        #[arg(long, default_value_t = pufkey_core::DEFAULT_SECRET_LEN)]
        secret_len: usize,

        /// Helper bytes per `write` command (device shell buffer is small)
        #[arg(long, default_value_t = 6)]
        chunk: usize,

        /// Local copy of the helper data
        #[arg(long, default_value = "helper.bin")]
        helper: String,

        /// Suppress per-iteration progress output
        #[arg(long)]
        quiet: bool,
    },

    /// Recover the device key from one fresh reading plus stored helper data
    Reconstruct {
        /// Serial port of the measurement rig
        #[arg(long, default_value = "/dev/ttyUSB0")]
        port: String,

        /// Baud rate of the serial port
        #[arg(long, default_value_t = 115200)]
        baud: u32,

        /// Power-off duration before the fresh reading, in seconds
        #[arg(long, default_value_t = 1.0)]
        off_time: f64,

        /// Helper data file written by `enroll`
        #[arg(long, default_value = "helper.bin")]
        helper: String,

        /// Secret length in bytes (defaults to the enrollment sidecar)
        #[arg(long)]
        secret_len: Option<usize>,

        /// Suppress progress output
        #[arg(long)]
        quiet: bool,
    },

    /// Statistical quality evaluation: min-entropy, bit-error rate
    Evaluate {
        /// Serial port of the measurement rig
        #[arg(long, default_value = "/dev/ttyUSB0")]
        port: String,

        /// Baud rate of the serial port
        #[arg(long, default_value_t = 115200)]
        baud: u32,

        /// Number of power cycles to measure
        #[arg(long, default_value_t = 500)]
        repetitions: usize,

        /// Power-off duration per cycle in seconds
        #[arg(long, default_value_t = 1.0)]
        off_time: f64,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,

        /// Suppress per-iteration progress output
        #[arg(long)]
        quiet: bool,
    },

    /// Pairwise-Hamming uniqueness analysis of a captured console log
    Analyze {
        /// Log file containing idstart{ ... }idend lines
        log: String,

        /// Write the full report as JSON
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Enroll {
            port,
            baud,
            repetitions,
            off_time,
            secret_len,
            chunk,
            helper,
            quiet,
        } => commands::enroll::run(commands::enroll::EnrollConfig {
            port: &port,
            baud,
            repetitions,
            off_time,
            secret_len,
            chunk,
            helper_path: &helper,
            verbose: !quiet,
        }),
        Commands::Reconstruct {
            port,
            baud,
            off_time,
            helper,
            secret_len,
            quiet,
        } => commands::reconstruct::run(commands::reconstruct::ReconstructConfig {
            port: &port,
            baud,
            off_time,
            helper_path: &helper,
            secret_len,
            verbose: !quiet,
        }),
        Commands::Evaluate {
            port,
            baud,
            repetitions,
            off_time,
            output,
            quiet,
        } => commands::evaluate::run(commands::evaluate::EvaluateConfig {
            port: &port,
            baud,
            repetitions,
            off_time,
            output_path: output.as_deref(),
            verbose: !quiet,
        }),
        Commands::Analyze { log, output } => commands::analyze::run(commands::analyze::AnalyzeConfig {
            log_path: &log,
            output_path: output.as_deref(),
        }),
    }
}
