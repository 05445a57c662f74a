//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  tempscope   cycle #42   every 1s   °C       │
//! ├──────────────────────────────────────────────┤
//! │ CPU, peak: 71.5 ━━  GPU, peak: 64.0 ━━       │
//! │  ⣀⡠⠤⠒⠉                                       │
//! │        ⠉⠒⠤⣀                                  │
//! ├──────────────────────────────────────────────┤
//! │  stats.csv  14/50 buffered  100 rows saved   │
//! ├──────────────────────────────────────────────┤
//! │  q/Ctrl+C: stop   s: snapshot                │
//! └──────────────────────────────────────────────┘

use ratatui::{prelude::*, widgets::*};

use super::app::{Snapshot, TuiState};
use super::theme::Palette;

pub fn draw(f: &mut Frame, state: &TuiState) {
    let palette = state.theme.palette();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        f.area(),
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(8),    // chart
            Constraint::Length(3), // status
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], state, &palette);
    match &state.snapshot {
        Some(snapshot) => {
            draw_chart(f, rows[1], snapshot, &palette);
            draw_status(f, rows[2], state, snapshot, &palette);
        }
        None => {
            let p = Paragraph::new("Waiting for the first reading...")
                .style(Style::default().fg(palette.muted))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(p, rows[1]);
        }
    }
    draw_keys(f, rows[3], &palette);

    if state.prompting {
        draw_prompt(f, &palette);
    }
}

fn draw_title(f: &mut Frame, area: Rect, state: &TuiState, palette: &Palette) {
    let detail = match &state.snapshot {
        Some(s) => format!(
            "  cycle #{}  every {}s  {} ",
            s.cycle,
            s.interval_secs,
            s.unit.symbol()
        ),
        None => String::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(Line::from(vec![
            Span::styled(" tempscope ", Style::default().bold().fg(palette.accent)),
            Span::styled(detail, Style::default().fg(palette.muted)),
        ]));

    f.render_widget(block, area);
}

/// Y bounds over every visible point, padded by one degree. Falls back to a
/// room-temperature range before any data arrives.
pub fn y_bounds(snapshot: &Snapshot) -> (f64, f64) {
    let mut values = snapshot.frames.iter().flat_map(|fr| fr.data.iter().copied());
    let Some(first) = values.next() else {
        return (0.0, 100.0);
    };
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    ((min - 1.0).floor(), (max + 1.0).ceil())
}

fn draw_chart(f: &mut Frame, area: Rect, snapshot: &Snapshot, palette: &Palette) {
    let points: Vec<Vec<(f64, f64)>> = snapshot
        .frames
        .iter()
        .map(|fr| {
            fr.data
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = snapshot
        .frames
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (frame, data))| {
            Dataset::default()
                .name(frame.legend())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(palette.series_color(i)))
                .data(data)
        })
        .collect();

    let longest = snapshot
        .frames
        .iter()
        .map(|fr| fr.data.len())
        .max()
        .unwrap_or(0);
    let x_max = (longest.max(2) - 1) as f64;
    let (y_min, y_max) = y_bounds(snapshot);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(format!(" temperature ({}) ", snapshot.unit.symbol())),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(palette.muted))
                .bounds([0.0, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(palette.muted))
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format!("{y_min:.0}")),
                    Line::from(format!("{:.0}", (y_min + y_max) / 2.0)),
                    Line::from(format!("{y_max:.0}")),
                ]),
        );

    f.render_widget(chart, area);
}

fn draw_status(f: &mut Frame, area: Rect, state: &TuiState, snapshot: &Snapshot, palette: &Palette) {
    let mut spans = match &snapshot.output {
        Some(path) => vec![
            Span::styled(path.clone(), Style::default().bold()),
            Span::raw(format!(
                "  {}/{} buffered  {} rows saved",
                snapshot.pending, snapshot.threshold, snapshot.rows_written
            )),
        ],
        None => vec![Span::styled(
            "not recording",
            Style::default().fg(palette.muted),
        )],
    };

    if let Some(err) = snapshot.errors.first() {
        spans.push(Span::styled(
            format!("  ! {err}"),
            Style::default().fg(Color::Red),
        ));
    } else if let Some(notice) = &state.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(palette.accent),
        ));
    }

    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect, palette: &Palette) {
    let bar = Paragraph::new(" q/Esc/Ctrl+C: stop   s: snapshot")
        .style(Style::default().bg(palette.muted).fg(palette.foreground));
    f.render_widget(bar, area);
}

fn draw_prompt(f: &mut Frame, palette: &Palette) {
    let area = centered(f.area(), 40, 5);
    f.render_widget(Clear, area);
    let p = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Stop monitoring? [y/N]",
            Style::default().bold(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent)),
    );
    f.render_widget(p, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::Theme;
    use ratatui::backend::TestBackend;
    use tempscope_core::{SeriesFrame, Series, TemperatureUnit};

    fn snapshot(cpu: Vec<f64>, gpu: Vec<f64>) -> Snapshot {
        Snapshot {
            cycle: 3,
            unit: TemperatureUnit::Celsius,
            interval_secs: 1.0,
            frames: vec![
                SeriesFrame {
                    series: Series::CpuTemp,
                    label: "CPU".into(),
                    data: cpu,
                    peak: Some(48.0),
                    current: None,
                },
                SeriesFrame {
                    series: Series::GpuTemp,
                    label: "GPU".into(),
                    data: gpu,
                    peak: None,
                    current: None,
                },
            ],
            pending: 6,
            threshold: 50,
            rows_written: 0,
            output: Some("stats.csv".into()),
            errors: vec![],
        }
    }

    fn render(state: &TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn y_bounds_pad_and_default() {
        assert_eq!(y_bounds(&snapshot(vec![], vec![])), (0.0, 100.0));
        assert_eq!(
            y_bounds(&snapshot(vec![40.2, 47.5], vec![55.0])),
            (39.0, 56.0)
        );
    }

    #[test]
    fn legend_and_status_are_drawn() {
        let state = TuiState {
            snapshot: Some(snapshot(vec![45.0, 48.0, 46.0], vec![60.0, 61.0, 62.0])),
            theme: Theme::Matrix,
            ..Default::default()
        };
        let screen = render(&state);
        assert!(screen.contains("CPU, peak: 48.0"));
        assert!(screen.contains("GPU"));
        assert!(screen.contains("6/50 buffered"));
        assert!(!screen.contains("Stop monitoring?"));
    }

    #[test]
    fn prompt_overlays_chart() {
        let state = TuiState {
            snapshot: Some(snapshot(vec![45.0], vec![60.0])),
            prompting: true,
            ..Default::default()
        };
        assert!(render(&state).contains("Stop monitoring? [y/N]"));
    }

    #[test]
    fn first_error_is_shown() {
        let mut snap = snapshot(vec![45.0], vec![]);
        snap.errors = vec!["gpu_temp read failed: busy".into()];
        let state = TuiState {
            snapshot: Some(snap),
            ..Default::default()
        };
        assert!(render(&state).contains("gpu_temp read failed"));
    }

    #[test]
    fn waits_for_first_reading() {
        let screen = render(&TuiState::default());
        assert!(screen.contains("Waiting for the first reading"));
    }
}
