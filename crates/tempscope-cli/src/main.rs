//! CLI for tempscope: live CPU/GPU temperature chart in your terminal.

mod commands;
mod plain;
mod tui;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tempscope")]
#[command(about = "Simple to use terminal based system temperature monitor")]
#[command(version = tempscope_core::VERSION)]
struct Cli {
    /// Poll for new temperature data in x second intervals
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    interval: i64,

    /// Output file name to write recorded data to (must end in .csv)
    #[arg(short, long)]
    output: Option<String>,

    /// Display and record temperatures in Fahrenheit
    #[arg(short, long, alias = "fahrenheit")]
    farenheit: bool,

    /// Comma-separated modules to monitor (cpu, gpu)
    #[arg(short, long, default_value = "cpu,gpu")]
    modules: String,

    /// Show the current value of every series in its legend
    #[arg(long)]
    current: bool,

    /// Show the peak value of every series in its legend
    #[arg(long)]
    peak: bool,

    /// Chart theme
    #[arg(short, long, default_value = "pro")]
    theme: String,

    /// Number of chart slots per series
    #[arg(long, default_value_t = tempscope_core::DEFAULT_MAX_WINDOW)]
    window: usize,

    /// Refuse to write rows when a series missed a reading (exits with an error)
    #[arg(long)]
    strict_alignment: bool,

    /// Print one line per cycle instead of the full-screen chart
    #[arg(long)]
    plain: bool,

    /// Write log output to this file
    #[arg(long)]
    log_file: Option<String>,

    /// List the modules this machine supports and exit
    #[arg(long)]
    list_modules: bool,

    /// List the available chart themes and exit
    #[arg(long)]
    list_themes: bool,
}

fn main() {
    let cli = Cli::parse();

    let full_screen = !(cli.plain || cli.list_modules || cli.list_themes);
    if let Err(e) = commands::init_logging(cli.log_file.as_deref(), full_screen) {
        eprintln!("Error: could not open log file: {e}");
        std::process::exit(2);
    }

    let code = if cli.list_themes {
        commands::list::themes()
    } else if cli.list_modules {
        commands::list::modules()
    } else {
        commands::monitor::run(commands::monitor::MonitorCommandConfig {
            interval: cli.interval,
            output: cli.output.as_deref(),
            fahrenheit: cli.farenheit,
            modules: &cli.modules,
            track_current: cli.current,
            track_peak: cli.peak,
            theme: &cli.theme,
            window: cli.window,
            strict_alignment: cli.strict_alignment,
            plain: cli.plain,
        })
    };

    std::process::exit(code);
}
