//! Ratatui-based terminal UI.
//!
//! The TUI provides a form for the seven valuation inputs, revalues after
//! every change, and renders the predicted multiple, enterprise value,
//! implied discount rate, and the feature audit table.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
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
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::cli::ValueArgs;
use crate::domain::{INCOME_MIN, IndustryCode, MONETARY_MAX, RATE_MAX, RATE_MIN, ValuationInputs};
use crate::error::AppError;
use crate::model::{GbtModel, Scorer, resolve_model_path};

/// Form fields, top to bottom.
const FIELD_INDUSTRY: usize = 0;
const FIELD_RATE: usize = 1;
const FIELD_SALES: usize = 2;
const FIELD_EBITDA: usize = 3;
const FIELD_INCOME: usize = 4;
const FIELD_DEBT: usize = 5;
const FIELD_BOOK: usize = 6;
const FIELD_COUNT: usize = 7;

/// Stepper increment for monetary fields ($ mn).
const MONETARY_STEP: f64 = 10.0;
/// Stepper increment for the real rate (10bp).
const RATE_STEP: f64 = 0.001;

/// Start the TUI.
pub fn run(args: ValueArgs) -> Result<(), AppError> {
    // Load the model before touching the terminal so a missing artifact
    // reports normally on stderr.
    let model_path = resolve_model_path(args.model.as_deref())?;
    let model = GbtModel::from_path(&model_path)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::anomaly(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(&args, model)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::anomaly(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::anomaly(format!(
                "Failed to enter alternate screen: {e}"
            )));
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

struct App {
    inputs: ValuationInputs,
    model: GbtModel,
    selected_field: usize,
    editing_value: bool,
    value_input: String,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(args: &ValueArgs, model: GbtModel) -> Result<Self, AppError> {
        let industry = match args.industry {
            Some(code) => IndustryCode::new(code)?,
            None => IndustryCode::new(IndustryCode::MIN)?,
        };
        let mut app = Self {
            inputs: crate::app::inputs_from_args(args, industry),
            model,
            selected_field: 0,
            editing_value: false,
            value_input: String::new(),
            status: String::new(),
            run: None,
        };
        app.revalue();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::anomaly(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::anomaly(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::anomaly(format!("Event read error: {e}")))? {
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

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing_value {
            self.handle_value_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_field > 0 {
                    self.selected_field -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_field < FIELD_COUNT - 1 {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1.0),
            KeyCode::Right => self.adjust_field(1.0),
            KeyCode::Enter => {
                self.value_input = self.current_field_text();
                self.editing_value = true;
                self.status = format!(
                    "Editing {}. Enter to apply, Esc to cancel.",
                    field_name(self.selected_field)
                );
            }
            KeyCode::Char('s') => self.save_record(),
            _ => {}
        }

        false
    }

    fn handle_value_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_value = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_value = false;
                self.apply_value_input();
            }
            KeyCode::Backspace => {
                self.value_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    self.value_input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Step the selected field: industry cycles, the rate moves in 10bp
    /// ticks, monetary fields move in $10mn ticks within their entry ranges.
    fn adjust_field(&mut self, delta: f64) {
        match self.selected_field {
            FIELD_INDUSTRY => {
                self.inputs.industry = if delta >= 0.0 {
                    self.inputs.industry.next()
                } else {
                    self.inputs.industry.prev()
                };
            }
            FIELD_RATE => {
                self.inputs.real_rate =
                    (self.inputs.real_rate + delta * RATE_STEP).clamp(RATE_MIN, RATE_MAX);
            }
            FIELD_SALES => {
                self.inputs.sales =
                    (self.inputs.sales + delta * MONETARY_STEP).clamp(0.0, MONETARY_MAX);
            }
            FIELD_EBITDA => {
                self.inputs.ebitda =
                    (self.inputs.ebitda + delta * MONETARY_STEP).clamp(0.0, self.inputs.sales);
            }
            FIELD_INCOME => {
                self.inputs.net_income_after_tax = (self.inputs.net_income_after_tax
                    + delta * MONETARY_STEP)
                    .clamp(INCOME_MIN, self.inputs.ebitda);
            }
            FIELD_DEBT => {
                self.inputs.total_debt =
                    (self.inputs.total_debt + delta * MONETARY_STEP).clamp(0.0, MONETARY_MAX);
            }
            FIELD_BOOK => {
                self.inputs.book_equity =
                    (self.inputs.book_equity + delta * MONETARY_STEP).clamp(0.0, MONETARY_MAX);
            }
            _ => {}
        }
        self.revalue();
    }

    /// Current field value as an edit buffer seed.
    fn current_field_text(&self) -> String {
        match self.selected_field {
            FIELD_INDUSTRY => self.inputs.industry.code().to_string(),
            FIELD_RATE => format!("{:.2}", self.inputs.real_rate * 100.0),
            FIELD_SALES => self.inputs.sales.to_string(),
            FIELD_EBITDA => self.inputs.ebitda.to_string(),
            FIELD_INCOME => self.inputs.net_income_after_tax.to_string(),
            FIELD_DEBT => self.inputs.total_debt.to_string(),
            FIELD_BOOK => self.inputs.book_equity.to_string(),
            _ => String::new(),
        }
    }

    fn apply_value_input(&mut self) {
        let trimmed = self.value_input.trim();

        if self.selected_field == FIELD_INDUSTRY {
            match trimmed.parse::<u8>().map_err(|e| e.to_string()).and_then(
                |code| IndustryCode::new(code).map_err(|e| e.to_string()),
            ) {
                Ok(industry) => self.inputs.industry = industry,
                Err(err) => {
                    self.status = format!("Invalid industry '{trimmed}': {err}");
                    return;
                }
            }
            self.revalue();
            return;
        }

        let value: f64 = match trimmed.parse() {
            Ok(v) => v,
            Err(e) => {
                self.status = format!("Invalid number '{trimmed}': {e}");
                return;
            }
        };

        match self.selected_field {
            // The rate field is edited in percent.
            FIELD_RATE => self.inputs.real_rate = value / 100.0,
            FIELD_SALES => self.inputs.sales = value,
            FIELD_EBITDA => self.inputs.ebitda = value,
            FIELD_INCOME => self.inputs.net_income_after_tax = value,
            FIELD_DEBT => self.inputs.total_debt = value,
            FIELD_BOOK => self.inputs.book_equity = value,
            _ => {}
        }
        self.revalue();
    }

    /// Run the pipeline for the current inputs. Typed values can be out of
    /// range; the rejection message names the field and no result is shown
    /// until the input is fixed.
    fn revalue(&mut self) {
        match crate::app::pipeline::run_valuation(&self.inputs, &self.model) {
            Ok(run) => {
                self.status = format!(
                    "multiple {:.2}x | EV $ {:.0} mn",
                    run.result.multiple, run.result.enterprise_value
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.run = None;
                self.status = err.to_string();
            }
        }
    }

    fn save_record(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to save.".to_string();
            return;
        };

        let path = PathBuf::from(format!(
            "mval_valuation_{}.json",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        match crate::io::record::write_valuation_json(&path, run) {
            Ok(()) => self.status = format!("Saved {}", path.display()),
            Err(err) => self.status = format!("Save failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("mval", Style::default().fg(Color::Cyan)),
            Span::raw(" — machine-learned enterprise valuation"),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "model: {} | industry: {}",
                self.model.describe(),
                self.inputs.industry.label()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_results(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = (0..FIELD_COUNT)
            .map(|field| ListItem::new(format!("{}: {}", field_name(field), self.field_value(field))))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Valuation Inputs").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_value {
            let hint = Paragraph::new(format!("edit: {}", self.value_input))
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Valuation").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No valuation — fix the rejected input.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::raw("EBITDA multiple: "),
            Span::styled(
                format!("{:.2} x", run.result.multiple),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw("Enterprise value: "),
            Span::styled(
                format!("$ {:.0} mn", run.result.enterprise_value),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw("Implied discount rate (zero growth): "),
            Span::styled(
                format!("{:.2} %", run.result.discount_rate),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Variables used:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (name, value) in run.features.iter() {
            lines.push(Line::from(Span::raw(format!("  {name:<12} {value:>12.4}"))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("model log-multiple: {:.4}", run.log_multiple),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines));
        frame.render_widget(p, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  s save  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    /// Display text for a form field's current value.
    fn field_value(&self, field: usize) -> String {
        match field {
            FIELD_INDUSTRY => self.inputs.industry.label(),
            FIELD_RATE => format!("{:.2} %", self.inputs.real_rate * 100.0),
            FIELD_SALES => format!("{:.1}", self.inputs.sales),
            FIELD_EBITDA => format!("{:.1}", self.inputs.ebitda),
            FIELD_INCOME => format!("{:.1}", self.inputs.net_income_after_tax),
            FIELD_DEBT => format!("{:.1}", self.inputs.total_debt),
            FIELD_BOOK => format!("{:.1}", self.inputs.book_equity),
            _ => String::new(),
        }
    }
}

fn field_name(field: usize) -> &'static str {
    match field {
        FIELD_INDUSTRY => "Industry",
        FIELD_RATE => "1y real rate",
        FIELD_SALES => "Sales ($ mn)",
        FIELD_EBITDA => "EBITDA ($ mn)",
        FIELD_INCOME => "Income after tax ($ mn)",
        FIELD_DEBT => "Total debt ($ mn)",
        FIELD_BOOK => "Book equity ($ mn)",
        _ => "",
    }
}
