use crate::event::{Event, EventResult};
use crate::keys::{ApiKeyConfig, KeyStore};
use crate::provider;
use crate::search::{SearchController, SearchOutcome, SearchStatus};
use crate::sections::{OutputConfig, SectionStore};
use crate::tui::{
    result_view, InputWidget, ResultView, SectionsPanel, SettingsAction, SettingsWidget,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc;

const EXAMPLE_TICKERS: [&str; 7] = [
    "삼성전자", "AAPL", "SCHD", "QQQ", "005930", "NVDA", "KODEX 200",
];

/// Which landing widget receives plain key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Sections,
}

/// Main application state: stores, controller, widgets and the outcome
/// channel fed by spawned request tasks.
pub struct App {
    key_store: KeyStore,
    section_store: SectionStore,
    api_config: ApiKeyConfig,
    output_config: OutputConfig,
    controller: SearchController,
    input: InputWidget,
    sections_panel: SectionsPanel,
    result_view: ResultView,
    settings: Option<SettingsWidget>,
    focus: Focus,
    outcome_tx: mpsc::UnboundedSender<SearchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SearchOutcome>,
    spinner_frame: usize,
    should_quit: bool,
}

impl App {
    pub fn new(key_store: KeyStore, section_store: SectionStore) -> Self {
        let api_config = key_store.load();
        let output_config = section_store.load();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            key_store,
            section_store,
            api_config,
            output_config,
            controller: SearchController::new(),
            input: InputWidget::new(),
            sections_panel: SectionsPanel::new(),
            result_view: ResultView::new(),
            settings: None,
            focus: Focus::Input,
            outcome_tx,
            outcome_rx,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_event(&mut self, event: Event) -> EventResult<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick => {
                self.on_tick();
                Ok(())
            }
            Event::Resize(_, _) => Ok(()),
        }
    }

    fn on_tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.controller.apply(outcome);
            if self.controller.status() == SearchStatus::Success {
                self.result_view.reset_scroll();
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        if self.settings.is_some() {
            self.handle_settings_key(key);
            return Ok(());
        }

        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.open_settings();
            return Ok(());
        }

        match self.controller.status() {
            SearchStatus::Idle => self.handle_landing_key(key),
            SearchStatus::Loading => {
                // Input stays disabled while a request is in flight; Esc
                // abandons the search (the late outcome goes stale).
                if key.code == KeyCode::Esc {
                    self.controller.reset();
                }
            }
            SearchStatus::Success => match key.code {
                KeyCode::Esc => self.controller.reset(),
                KeyCode::Up => self.result_view.scroll_up(1),
                KeyCode::Down => self.result_view.scroll_down(1),
                KeyCode::PageUp => self.result_view.scroll_up(10),
                KeyCode::PageDown => self.result_view.scroll_down(10),
                _ => {}
            },
            SearchStatus::Error => {
                if key.code == KeyCode::Esc {
                    self.controller.reset();
                }
            }
        }
        Ok(())
    }

    fn handle_landing_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Tab {
            self.focus = match self.focus {
                Focus::Input => Focus::Sections,
                Focus::Sections => Focus::Input,
            };
            return;
        }

        match self.focus {
            Focus::Sections => match key.code {
                KeyCode::Up => self.sections_panel.move_up(),
                KeyCode::Down => self.sections_panel.move_down(self.output_config.len()),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    if let Some(id) = self.sections_panel.selected(&self.output_config) {
                        self.section_store.toggle(&mut self.output_config, id);
                    }
                }
                KeyCode::Esc => self.focus = Focus::Input,
                _ => {}
            },
            Focus::Input => match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Esc => self.input.clear(),
                _ => self.input.handle_key(key),
            },
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let config = self.api_config.clone();
        let action = match self.settings.as_mut() {
            Some(settings) => settings.handle_key(key, &config),
            None => return,
        };
        match action {
            SettingsAction::None => {}
            SettingsAction::Close => self.settings = None,
            SettingsAction::Save { provider, key } => {
                self.key_store.set_key(provider, &key);
                self.api_config = self.key_store.set_provider(provider);
                tracing::debug!(provider = %provider, "api key saved, provider activated");
                self.settings = None;
            }
            SettingsAction::ClearKeys => {
                self.key_store.clear();
                self.api_config = self.key_store.load();
                if let Some(settings) = self.settings.as_mut() {
                    settings.refresh(&self.api_config);
                }
            }
        }
    }

    fn open_settings(&mut self) {
        self.settings = Some(SettingsWidget::new(&self.api_config));
    }

    /// Validate and launch one search.
    ///
    /// Without a key for the active provider the search is not issued; the
    /// user lands in the settings overlay instead.
    fn submit(&mut self) {
        let query = self.input.text();
        if query.trim().is_empty() {
            return;
        }
        if !self.key_store.has_key(None) {
            self.open_settings();
            return;
        }

        let Some(token) = self.controller.start(&query) else {
            return;
        };

        let provider = self.api_config.active_provider;
        let api_key = self
            .api_config
            .key_for(provider)
            .unwrap_or_default()
            .to_string();
        let output_config = self.output_config.clone();
        let tx = self.outcome_tx.clone();

        tokio::spawn(async move {
            let outcome = provider::dispatch(&query, provider, &api_key, &output_config).await;
            let _ = tx.send(SearchOutcome { token, outcome });
        });
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        match self.controller.status() {
            SearchStatus::Idle => self.render_landing(frame, area),
            SearchStatus::Loading => self.render_loading(frame, area),
            SearchStatus::Success => self.render_result(frame, area),
            SearchStatus::Error => self.render_error(frame, area),
        }

        if let Some(settings) = self.settings.as_mut() {
            settings.render(frame, area);
        }
    }

    fn render_landing(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // headline
                Constraint::Length(3), // search input
                Constraint::Length(10), // output sections
                Constraint::Min(3),    // hints + status line
            ])
            .split(area);

        self.render_headline(frame, rows[0]);
        self.input
            .render(frame, rows[1], self.focus == Focus::Input);
        self.sections_panel.render(
            frame,
            rows[2],
            &self.output_config,
            self.focus == Focus::Sections,
        );
        self.render_hints(frame, rows[3]);
    }

    fn render_headline(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("📸 Fin", Style::default().fg(Color::LightBlue)),
                Span::styled(
                    "Snap",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "  — 종목명 하나로 핵심 정보 즉시 파악",
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(Span::styled(
                "주식/ETF 이름을 입력하면 AI가 PER, 배당수익률, 52주 고저가 등 핵심 정보를 요약합니다.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(vec![
            Span::styled("예시: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                EXAMPLE_TICKERS.join("  "),
                Style::default().fg(Color::Gray),
            ),
        ])];

        if self.key_store.has_key(None) {
            lines.push(Line::from(Span::styled(
                format!("● {} 연결됨", self.api_config.active_provider.indicator()),
                Style::default().fg(Color::LightGreen),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "⚠️  검색하려면 먼저 API Key를 설정해주세요 (Ctrl+S).",
                Style::default().fg(Color::LightYellow),
            )));
        }

        lines.push(Line::from(Span::styled(
            "Ctrl+S=설정 │ Ctrl+C=종료",
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_loading(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);
        self.render_headline(frame, rows[0]);
        result_view::render_loading(frame, rows[1], self.spinner_frame);
    }

    fn render_result(&mut self, frame: &mut Frame, area: Rect) {
        if let Some(result) = self.controller.result().cloned() {
            self.result_view.render(frame, area, &result);
        }
    }

    fn render_error(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);
        self.render_headline(frame, rows[0]);
        let message = self.controller.error().unwrap_or("알 수 없는 오류");
        result_view::render_error(frame, rows[1], message);
    }
}
