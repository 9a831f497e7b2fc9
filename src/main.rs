use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pickem_terminal::config::PoolConfig;
use pickem_terminal::csv_load;
use pickem_terminal::export;
use pickem_terminal::fake_slate;
use pickem_terminal::ranker;
use pickem_terminal::state::{AppState, Matchup};

const DEMO_GAMES: usize = 14;

struct App {
    state: AppState,
    cfg: PoolConfig,
    should_quit: bool,
}

impl App {
    fn new(cfg: PoolConfig) -> Self {
        Self {
            state: AppState::new(),
            cfg,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('c') => self.compute(),
            KeyCode::Char('m') => {
                self.cfg.consensus_method = self.cfg.consensus_method.cycle(&self.cfg.weights);
                self.state.push_log(format!(
                    "[INFO] Consensus method: {}",
                    self.cfg.consensus_method.label()
                ));
                self.recompute_if_stale();
            }
            KeyCode::Char('v') => {
                self.cfg.devig = !self.cfg.devig;
                self.state.push_log(format!(
                    "[INFO] De-vig {}",
                    if self.cfg.devig { "enabled" } else { "disabled" }
                ));
                self.recompute_if_stale();
            }
            KeyCode::Char('e') => self.export(ExportFormat::Xlsx),
            KeyCode::Char('E') => self.export(ExportFormat::Csv),
            KeyCode::Char('J') => self.export(ExportFormat::Json),
            KeyCode::Char('r') => self.reload_slate(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn compute(&mut self) {
        if self.state.slate.is_empty() {
            self.state.push_log("[WARN] No slate loaded");
            return;
        }
        let summary = ranker::compute_slate(&mut self.state.slate, &self.cfg);
        // Show the board top pick first.
        self.state
            .slate
            .sort_by(|a, b| b.confidence_rank.cmp(&a.confidence_rank));
        self.state.selected = 0;
        self.state.computed = true;
        self.state.push_log(format!(
            "[INFO] Ranked {} games ({}, devig {})",
            summary.ranked,
            self.cfg.consensus_method.label(),
            if self.cfg.devig { "on" } else { "off" }
        ));
        if summary.unknown_consensus > 0 {
            self.state.push_log(format!(
                "[WARN] {} game(s) had no valid quotes and rank at the bottom",
                summary.unknown_consensus
            ));
        }
    }

    fn recompute_if_stale(&mut self) {
        if self.state.computed {
            self.compute();
        }
    }

    fn export(&mut self, format: ExportFormat) {
        if !self.state.computed {
            self.state.push_log("[WARN] Compute ranks before exporting (press c)");
            return;
        }
        let result = match format {
            ExportFormat::Xlsx => {
                export::export_picksheet_xlsx(&self.state.slate, &self.cfg.export_dir)
            }
            ExportFormat::Csv => {
                export::export_picksheet_csv(&self.state.slate, &self.cfg.export_dir)
            }
            ExportFormat::Json => {
                export::export_picksheet_json(&self.state.slate, &self.cfg.export_dir)
            }
        };
        match result {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} picks to {}",
                report.rows,
                report.path.display()
            )),
            Err(err) => self.state.push_log(format!("[ERROR] Export failed: {err:#}")),
        }
    }

    fn reload_slate(&mut self) {
        match load_slate(&self.cfg) {
            Ok((slate, source, warnings)) => {
                let n = slate.len();
                self.state.set_slate(slate, source);
                for w in warnings {
                    self.state.push_log(w);
                }
                self.state.push_log(format!(
                    "[INFO] Loaded {n} games from {}",
                    self.state.source_label
                ));
            }
            Err(err) => self.state.push_log(format!("[ERROR] Reload failed: {err:#}")),
        }
    }
}

enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

fn load_slate(cfg: &PoolConfig) -> Result<(Vec<Matchup>, String, Vec<String>)> {
    match &cfg.slate_path {
        Some(path) => {
            let loaded = csv_load::load_slate_csv(path)?;
            Ok((
                loaded.matchups,
                path.display().to_string(),
                loaded.warnings,
            ))
        }
        None => Ok((
            fake_slate::demo_slate(DEMO_GAMES),
            "demo".to_string(),
            Vec::new(),
        )),
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let cfg = PoolConfig::from_env();
    let mut app = App::new(cfg);
    for warning in app.cfg.warnings.clone() {
        app.state.push_log(format!("[WARN] {warning}"));
    }
    // A bad slate file is a structural error: fail before touching the screen.
    let (slate, source, warnings) = load_slate(&app.cfg)?;
    app.state.set_slate(slate, source);
    for w in warnings {
        app.state.push_log(w);
    }
    app.state.push_log(format!(
        "[INFO] Loaded {} games from {} (c to rank)",
        app.state.slate.len(),
        app.state.source_label
    ));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_slate(frame, chunks[1], app);
    render_console(frame, chunks[2], app);

    let footer = Paragraph::new(
        "j/k Move | c Compute | m Method | v De-vig | e XLSX | E CSV | J JSON | r Reload | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    format!(
        "PICKEM TERMINAL | {} games | source: {} | method: {} | devig: {} | tiebreaks: {}",
        app.state.slate.len(),
        app.state.source_label,
        app.cfg.consensus_method.label(),
        if app.cfg.devig { "on" } else { "off" },
        app.cfg.tiebreaks.describe(),
    )
}

fn slate_columns() -> Vec<Constraint> {
    vec![
        Constraint::Length(5),
        Constraint::Length(24),
        Constraint::Length(24),
        Constraint::Length(5),
        Constraint::Length(17),
        Constraint::Length(7),
        Constraint::Min(10),
    ]
}

fn render_slate(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = slate_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.clone())
        .split(sections[0]);
    let titles = ["RANK", "PICK", "OPPONENT", "VEN", "KICKOFF", "CONS", "BOOKS"];
    for (i, title) in titles.iter().enumerate() {
        let cell = Paragraph::new(*title).style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(cell, header_cols[i]);
    }

    let list_area = sections[1];
    if app.state.slate.is_empty() {
        let empty =
            Paragraph::new("No slate loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let total = app.state.slate.len();
    let start = app
        .state
        .selected
        .saturating_sub(visible.saturating_sub(1))
        .min(total.saturating_sub(visible.min(total)));
    let end = (start + visible).min(total);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == app.state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);

        let m = &app.state.slate[idx];
        let rank = m
            .confidence_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let venue = if m.favorite_is_home { "HOME" } else { "AWAY" };
        let consensus = m
            .consensus_prob
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "?".to_string());

        render_cell(frame, cols[0], &rank, row_style);
        render_cell(frame, cols[1], &m.favorite, row_style);
        render_cell(frame, cols[2], &m.underdog, row_style);
        render_cell(frame, cols[3], venue, row_style);
        render_cell(frame, cols[4], &format_kickoff(m.kickoff), row_style);
        render_cell(frame, cols[5], &consensus, row_style);
        render_cell(frame, cols[6], &books_cell(m), row_style);
    }
}

fn render_cell(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    frame.render_widget(Paragraph::new(text.to_string()).style(style), area);
}

fn books_cell(m: &Matchup) -> String {
    m.books
        .iter()
        .map(|b| {
            let p = b
                .fav_prob
                .map(|p| format!("{:.0}", p * 100.0))
                .or_else(|| b.fav_ml.map(|ml| format!("{ml:+}")))
                .unwrap_or_else(|| "--".to_string());
            format!("{} {}", book_abbrev(&b.book), p)
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn book_abbrev(book: &str) -> String {
    let letters: String = book.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    letters.chars().take(3).collect::<String>().to_ascii_uppercase()
}

fn format_kickoff(kickoff: Option<DateTime<Utc>>) -> String {
    match kickoff {
        Some(k) => k.format("%a %m-%d %H:%M").to_string(),
        None => "TBD".to_string(),
    }
}

fn render_console(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Console").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = if app.state.logs.is_empty() {
        "No messages yet".to_string()
    } else {
        let take = inner.height.max(1) as usize;
        let mut lines: Vec<String> = app.state.logs.iter().rev().take(take).cloned().collect();
        lines.reverse();
        lines.join("\n")
    };
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Pickem Terminal - Help",
        "",
        "Slate:",
        "  j/k or ↑/↓   Move",
        "  c            Compute confidence ranks",
        "  m            Cycle consensus method",
        "  v            Toggle de-vig",
        "  r            Reload slate (CSV or fresh demo)",
        "",
        "Export:",
        "  e            Picksheet XLSX",
        "  E            Picksheet CSV",
        "  J            Picksheet JSON",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
