//! Line-oriented frontend for pipes, logs and dumb terminals.

use std::io::{self, BufRead, Write};

use tempscope_core::{Decision, Frontend, View};

pub struct PlainFrontend<W: Write, R: BufRead> {
    out: W,
    input: R,
}

impl<W: Write, R: BufRead> PlainFrontend<W, R> {
    pub fn new(out: W, input: R) -> Self {
        Self { out, input }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}

/// `#3  CPU 45.0°C (peak 48.0)  GPU --  [6/50 buffered]`
pub fn format_line(view: &View<'_>) -> String {
    let mut line = format!("#{}", view.report.cycle);
    let symbol = view.unit.symbol();
    for frame in view.frames {
        line.push_str("  ");
        line.push_str(&frame.label);
        match view.report.reading(frame.series) {
            Some(v) => line.push_str(&format!(" {v:.1}{symbol}")),
            None => line.push_str(" --"),
        }
        if let Some(p) = frame.peak {
            line.push_str(&format!(" (peak {p:.1})"));
        }
    }
    if view.buffer.is_enabled() {
        line.push_str(&format!(
            "  [{}/{} buffered]",
            view.buffer.pending_count(),
            view.buffer.threshold()
        ));
    }
    if let Some(flush) = &view.report.flushed {
        line.push_str(&format!("  saved {} rows", flush.rows));
    }
    line
}

impl<W: Write, R: BufRead> Frontend for PlainFrontend<W, R> {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        writeln!(self.out, "{}", format_line(view))?;
        for err in &view.report.errors {
            writeln!(self.out, "  ! {err}")?;
        }
        self.out.flush()
    }

    fn confirm_stop(&mut self) -> io::Result<Decision> {
        write!(self.out, "\nStop monitoring? [y/N] ")?;
        self.out.flush()?;
        let mut answer = String::new();
        // EOF means nobody is left to answer.
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.out)?;
            return Ok(Decision::Stop);
        }
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Decision::Stop,
            _ => Decision::Continue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempscope_core::{
        AlignmentPolicy, CycleReport, Error, SampleBuffer, Series, SeriesFrame, TemperatureUnit,
    };

    fn frame(series: Series, label: &str, data: Vec<f64>, peak: Option<f64>) -> SeriesFrame {
        SeriesFrame {
            series,
            label: label.into(),
            data,
            peak,
            current: None,
        }
    }

    #[test]
    fn line_shows_readings_and_gaps() {
        let frames = vec![
            frame(Series::CpuTemp, "CPU", vec![45.0], Some(48.0)),
            frame(Series::GpuTemp, "GPU", vec![], None),
        ];
        let report = CycleReport {
            cycle: 3,
            readings: vec![(Series::CpuTemp, 45.0)],
            errors: vec![Error::TransientRead {
                series: Series::GpuTemp,
                reason: "busy".into(),
            }],
            flushed: None,
        };
        let mut buffer = SampleBuffer::new(
            Some("unused.csv".into()),
            50,
            AlignmentPolicy::Truncate,
        );
        for _ in 0..6 {
            buffer.record(Series::CpuTemp, 45.0).unwrap();
        }
        let view = View {
            frames: &frames,
            report: &report,
            unit: TemperatureUnit::Celsius,
            buffer: &buffer,
            interval: Duration::from_secs(1),
        };

        assert_eq!(
            format_line(&view),
            "#3  CPU 45.0°C (peak 48.0)  GPU --  [6/50 buffered]"
        );

        let mut plain = PlainFrontend::new(Vec::new(), io::empty());
        plain.render(&view).unwrap();
        let out = String::from_utf8(plain.into_output()).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().nth(1).unwrap().starts_with("  ! "));
    }

    #[test]
    fn without_output_no_buffer_column() {
        let frames = vec![frame(Series::CpuTemp, "CPU", vec![100.4], None)];
        let report = CycleReport {
            cycle: 1,
            readings: vec![(Series::CpuTemp, 100.4)],
            ..Default::default()
        };
        let buffer = SampleBuffer::disabled();
        let view = View {
            frames: &frames,
            report: &report,
            unit: TemperatureUnit::Fahrenheit,
            buffer: &buffer,
            interval: Duration::from_secs(1),
        };
        assert_eq!(format_line(&view), "#1  CPU 100.4°F");
    }

    #[test]
    fn prompt_answers() {
        let cases = [
            ("y\n", Decision::Stop),
            ("YES\n", Decision::Stop),
            ("n\n", Decision::Continue),
            ("\n", Decision::Continue),
            ("maybe\n", Decision::Continue),
            ("", Decision::Stop),
        ];
        for (input, expected) in cases {
            let mut plain = PlainFrontend::new(Vec::new(), input.as_bytes());
            assert_eq!(plain.confirm_stop().unwrap(), expected, "input {input:?}");
            let out = String::from_utf8(plain.into_output()).unwrap();
            assert!(out.contains("Stop monitoring? [y/N]"));
        }
    }
}
