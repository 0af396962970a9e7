use crate::keys::{AiProvider, ApiKeyConfig};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

/// What the app should do after a settings key press.
pub enum SettingsAction {
    /// Keep the overlay open.
    None,
    /// Close without further changes.
    Close,
    /// Persist the entered key for the selected provider and make that
    /// provider active.
    Save { provider: AiProvider, key: String },
    /// Remove all persisted key data.
    ClearKeys,
}

/// API key entry overlay: provider selection plus masked key input.
pub struct SettingsWidget {
    provider: AiProvider,
    key_input: TextArea<'static>,
    has_gemini_key: bool,
    has_openai_key: bool,
}

impl SettingsWidget {
    pub fn new(config: &ApiKeyConfig) -> Self {
        let mut widget = Self {
            provider: config.active_provider,
            key_input: TextArea::default(),
            has_gemini_key: config.gemini.is_some(),
            has_openai_key: config.openai.is_some(),
        };
        widget.reset_input(config);
        widget
    }

    fn reset_input(&mut self, config: &ApiKeyConfig) {
        let mut textarea = TextArea::default();
        if let Some(key) = config.key_for(self.provider) {
            textarea.insert_str(key);
        }
        textarea.set_mask_char('•');
        textarea.set_cursor_line_style(Style::default());
        self.key_input = textarea;
    }

    /// Reflect a freshly persisted config (after save/clear).
    pub fn refresh(&mut self, config: &ApiKeyConfig) {
        self.has_gemini_key = config.gemini.is_some();
        self.has_openai_key = config.openai.is_some();
        self.reset_input(config);
    }

    /// Switch the provider tab, reloading that provider's stored key.
    pub fn switch_provider(&mut self, config: &ApiKeyConfig) {
        self.provider = match self.provider {
            AiProvider::Gemini => AiProvider::OpenAI,
            AiProvider::OpenAI => AiProvider::Gemini,
        };
        self.reset_input(config);
    }

    pub fn handle_key(&mut self, key: KeyEvent, config: &ApiKeyConfig) -> SettingsAction {
        match key.code {
            KeyCode::Esc => SettingsAction::Close,
            KeyCode::Tab => {
                self.switch_provider(config);
                SettingsAction::None
            }
            KeyCode::Enter => SettingsAction::Save {
                provider: self.provider,
                key: self.key_input.lines().join(""),
            },
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SettingsAction::ClearKeys
            }
            _ => {
                self.key_input.input(key);
                SettingsAction::None
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(area, 64, 12);
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                " ⚙️  API Key 설정 ",
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(Color::LightBlue));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // provider tabs
                Constraint::Length(3), // key input
                Constraint::Min(3),    // help
            ])
            .split(inner);

        self.render_provider_tabs(frame, rows[0]);

        self.key_input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" API Key ")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(&self.key_input, rows[1]);

        let help = vec![
            Line::from(Span::styled(
                "키는 이 컴퓨터의 설정 폴더에만 저장됩니다. 서버로 전송되지 않습니다.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "Tab=공급자 전환 │ Enter=저장 │ Ctrl+D=모든 키 삭제 │ Esc=닫기",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(help), rows[2]);
    }

    fn render_provider_tabs(&self, frame: &mut Frame, area: Rect) {
        let tab = |provider: AiProvider, has_key: bool| -> Span<'static> {
            let selected = self.provider == provider;
            let marker = if has_key { " ●" } else { "" };
            let text = format!(" {}{marker} ", provider.indicator());
            if selected {
                Span::styled(
                    text,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(text, Style::default().fg(Color::Gray))
            }
        };

        let line = Line::from(vec![
            Span::raw("공급자: "),
            tab(AiProvider::Gemini, self.has_gemini_key),
            Span::raw("  "),
            tab(AiProvider::OpenAI, self.has_openai_key),
        ]);
        frame.render_widget(Paragraph::new(vec![line]), area);
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
