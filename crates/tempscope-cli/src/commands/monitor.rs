//! Default command: poll sensors and chart them until told to stop.

use std::io;

use tempscope_core::{
    AlignmentPolicy, DEFAULT_FLUSH_THRESHOLD, Error, Interrupt, Monitor, MonitorConfig,
    MonitorOptions, RunSummary, SystemSensors, validate_output_path,
};

use crate::plain::PlainFrontend;
use crate::tui::app::TuiFrontend;
use crate::tui::theme::Theme;

pub struct MonitorCommandConfig<'a> {
    pub interval: i64,
    pub output: Option<&'a str>,
    pub fahrenheit: bool,
    pub modules: &'a str,
    pub track_current: bool,
    pub track_peak: bool,
    pub theme: &'a str,
    pub window: usize,
    pub strict_alignment: bool,
    pub plain: bool,
}

impl MonitorCommandConfig<'_> {
    fn options(&self) -> MonitorOptions {
        MonitorOptions {
            interval_secs: self.interval,
            output: self.output.map(str::to_string),
            fahrenheit: self.fahrenheit,
            modules: self.modules.to_string(),
            track_peak: self.track_peak,
            track_current: self.track_current,
            max_window: self.window,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            alignment: if self.strict_alignment {
                AlignmentPolicy::Lockstep
            } else {
                AlignmentPolicy::Truncate
            },
        }
    }
}

/// Run the monitor and return the process exit code.
pub fn run(cmd: MonitorCommandConfig<'_>) -> i32 {
    let theme: Theme = match cmd.theme.parse() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    // Reject a bad path before touching any sensor.
    if let Some(path) = cmd.output {
        if let Err(e) = validate_output_path(path) {
            eprintln!("Error: {e}");
            return e.exit_code();
        }
    }

    let sensors = SystemSensors::detect();
    let config = match MonitorConfig::resolve(&cmd.options(), &sensors) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Detected: {}", sensors.describe());
            return e.exit_code();
        }
    };
    log::info!(
        "monitoring {:?} every {:?} ({})",
        config.series,
        config.interval,
        config.unit
    );

    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || handler.trigger()) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    let mut monitor = Monitor::new(&config, &sensors, interrupt);
    let outcome = if cmd.plain {
        let stdin = io::stdin();
        let mut frontend = PlainFrontend::new(io::stdout(), stdin.lock());
        monitor.run(&mut frontend)
    } else {
        match TuiFrontend::enter(theme) {
            Ok(mut frontend) => {
                let outcome = monitor.run(&mut frontend);
                if let Err(e) = frontend.leave() {
                    log::warn!("could not restore terminal: {e}");
                }
                outcome
            }
            Err(e) => Err(Error::Terminal(e)),
        }
    };

    match outcome {
        Ok(summary) => {
            print_summary(&summary, config.output.as_deref());
            0
        }
        Err(e) => {
            // `run` has already made its final flush attempt.
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}

fn print_summary(summary: &RunSummary, output: Option<&std::path::Path>) {
    println!("Stopped after {} cycle(s).", summary.cycles);
    let Some(path) = output else {
        return;
    };
    println!("{} row(s) saved to {}", summary.rows_written, path.display());
    if let Some(e) = &summary.final_flush_error {
        eprintln!("Warning: final save failed: {e}");
        eprintln!("{} reading(s) were not saved.", summary.unsaved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd<'a>() -> MonitorCommandConfig<'a> {
        MonitorCommandConfig {
            interval: -3,
            output: Some("run.csv"),
            fahrenheit: true,
            modules: "gpu",
            track_current: true,
            track_peak: false,
            theme: "pro",
            window: 30,
            strict_alignment: true,
            plain: true,
        }
    }

    #[test]
    fn flags_map_onto_options() {
        let o = cmd().options();
        assert_eq!(o.interval_secs, -3);
        assert_eq!(o.output.as_deref(), Some("run.csv"));
        assert!(o.fahrenheit);
        assert_eq!(o.modules, "gpu");
        assert!(o.track_current && !o.track_peak);
        assert_eq!(o.max_window, 30);
        assert_eq!(o.flush_threshold, DEFAULT_FLUSH_THRESHOLD);
        assert_eq!(o.alignment, AlignmentPolicy::Lockstep);
    }

    #[test]
    fn unknown_theme_exits_with_config_code() {
        let mut c = cmd();
        c.theme = "neon";
        assert_eq!(run(c), 2);
    }

    #[test]
    fn bad_extension_exits_with_config_code() {
        let mut c = cmd();
        c.output = Some("run.txt");
        assert_eq!(run(c), 2);
    }
}
