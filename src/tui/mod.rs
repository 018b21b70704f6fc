//! Ratatui-based terminal UI.
//!
//! An interactive quote form: type the asset value, tick services, pick the
//! surcharge policy, and the breakdown on the right is recomputed on every
//! change. Nothing is stored from here; use `tariffa submit` for that.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::cli::TuiArgs;
use crate::config::Settings;
use crate::domain::{
    AssetValue, ComplexityLevel, Quotation, RegulationParams, ServiceCategory, ServiceSelection,
    SurchargePolicy,
};
use crate::error::AppError;
use crate::report::format_quotation;
use crate::store::{JsonFileStore, QuoteStore};

/// Start the TUI.
pub fn run(args: TuiArgs, settings: &Settings) -> Result<(), AppError> {
    // Read the catalogue before touching the terminal so store errors print normally.
    let store = JsonFileStore::in_dir(&settings.data_dir);
    let mut names: Vec<String> = store.list_services()?.into_iter().map(|s| s.name).collect();
    if names.is_empty() {
        names = ServiceCategory::ALL.iter().map(|c| c.name().to_string()).collect();
    }

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(names, settings.params, args.value);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Rows above the service list: asset value, policy.
const FIXED_ROWS: usize = 2;

struct App {
    params: RegulationParams,
    value_input: String,
    editing_value: bool,
    policy: SurchargePolicy,
    services: Vec<(String, bool)>,
    selected_row: usize,
    status: String,
    quotation: Option<Quotation>,
}

impl App {
    fn new(service_names: Vec<String>, params: RegulationParams, value: Option<String>) -> Self {
        let mut app = Self {
            params,
            value_input: value.unwrap_or_default(),
            editing_value: false,
            policy: SurchargePolicy::ServiceCount,
            services: service_names.into_iter().map(|n| (n, false)).collect(),
            selected_row: 0,
            status: String::new(),
            quotation: None,
        };
        app.recompute();
        app
    }

    fn row_count(&self) -> usize {
        FIXED_ROWS + self.services.len()
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_value {
            self.handle_value_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_row + 1 < self.row_count() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Left => self.adjust_policy(false),
            KeyCode::Right => self.adjust_policy(true),
            KeyCode::Enter | KeyCode::Char(' ') => match self.selected_row {
                0 => {
                    self.editing_value = true;
                    self.status = "Editing value. Enter to apply, Esc to cancel.".to_string();
                }
                1 => self.adjust_policy(true),
                row => self.toggle_service(row - FIXED_ROWS),
            },
            KeyCode::Char('c') => {
                for (_, on) in &mut self.services {
                    *on = false;
                }
                self.recompute();
            }
            _ => {}
        }
        false
    }

    fn handle_value_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_value = false;
                self.status = "Value edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_value = false;
                self.recompute();
            }
            KeyCode::Backspace => {
                self.value_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || matches!(c, '.' | ',' | '-') {
                    self.value_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_policy(&mut self, forward: bool) {
        if self.selected_row != 1 {
            return;
        }
        self.policy = if forward {
            next_policy(self.policy)
        } else {
            prev_policy(self.policy)
        };
        self.recompute();
    }

    fn toggle_service(&mut self, idx: usize) {
        if let Some((_, on)) = self.services.get_mut(idx) {
            *on = !*on;
        }
        self.recompute();
    }

    fn selected_names(&self) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn recompute(&mut self) {
        self.quotation = None;

        if self.value_input.trim().is_empty() {
            self.status = "Enter the asset value.".to_string();
            return;
        }
        let asset = match AssetValue::parse(&self.value_input) {
            Ok(v) => v,
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };
        let selection = match ServiceSelection::new(self.selected_names()) {
            Ok(s) => s,
            Err(e) => {
                self.status = e.to_string();
                return;
            }
        };

        match crate::tariff::compute_fee(asset.value(), &selection, self.policy, &self.params) {
            Ok(q) => {
                let defaulted = q.defaulted_services();
                self.status = if defaulted.is_empty() {
                    format!("bracket {} | {}", q.bracket().index, self.policy.describe())
                } else {
                    format!("default category used for: {}", defaulted.join(", "))
                };
                self.quotation = Some(q);
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("tariffa", Style::default().fg(Color::Cyan)),
            Span::raw(" - preventivo servizi legali"),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_breakdown(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let value_label = if self.editing_value {
            format!("Valore: {}_", self.value_input)
        } else if self.value_input.trim().is_empty() {
            "Valore: -".to_string()
        } else {
            format!("Valore: {}", self.value_input.trim())
        };

        let mut items = Vec::with_capacity(self.row_count());
        items.push(ListItem::new(value_label));
        items.push(ListItem::new(format!("Modalità: {}", policy_label(self.policy))));
        for (name, on) in &self.services {
            let mark = if *on { "[x]" } else { "[ ]" };
            items.push(ListItem::new(format!("{mark} {name}")));
        }

        let list = List::new(items)
            .block(Block::default().title("Preventivo").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_row));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_breakdown(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Dettaglio").borders(Borders::ALL);
        let p = match &self.quotation {
            Some(q) => Paragraph::new(Text::from(format_quotation(q, &self.params))).block(block),
            None => Paragraph::new(self.status.as_str())
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .block(block),
        };
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter/Space edit·toggle  ←/→ mode  c clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn policy_label(policy: SurchargePolicy) -> String {
    match policy {
        SurchargePolicy::ServiceCount => "combinato (n. servizi)".to_string(),
        SurchargePolicy::Complexity(level) => format!("dettagliato, complessità {}", level.display_name()),
    }
}

/// Combined -> standard -> media -> alta -> molto alta -> combined.
fn next_policy(cur: SurchargePolicy) -> SurchargePolicy {
    match cur {
        SurchargePolicy::ServiceCount => SurchargePolicy::Complexity(ComplexityLevel::Standard),
        SurchargePolicy::Complexity(ComplexityLevel::MoltoAlta) => SurchargePolicy::ServiceCount,
        SurchargePolicy::Complexity(level) => SurchargePolicy::Complexity(level.next()),
    }
}

fn prev_policy(cur: SurchargePolicy) -> SurchargePolicy {
    let mut p = cur;
    // Five states in the cycle; four steps forward is one step back.
    for _ in 0..4 {
        p = next_policy(p);
    }
    p
}
