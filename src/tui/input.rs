use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_textarea::TextArea;

const TITLE: &str = " 🔍 종목명/티커 입력 (Enter=검색 │ Tab=출력 항목 │ Ctrl+S=설정) ";

/// Search input wrapper around tui-textarea.
pub struct InputWidget {
    textarea: TextArea<'static>,
}

impl InputWidget {
    pub fn new() -> Self {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text("삼성전자, AAPL, SCHD, QQQ …");
        textarea.set_block(styled_block(false));
        textarea.set_cursor_line_style(Style::default());
        Self { textarea }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.textarea.input(key);
    }

    /// Current query text. The box keeps its content after submit so the
    /// user can tweak and re-search.
    pub fn text(&self) -> String {
        self.textarea.lines().join(" ")
    }

    pub fn set_text(&mut self, text: &str) {
        self.clear();
        self.textarea.insert_str(text);
    }

    pub fn clear(&mut self) {
        self.textarea = TextArea::default();
        self.textarea.set_placeholder_text("삼성전자, AAPL, SCHD, QQQ …");
        self.textarea.set_block(styled_block(false));
        self.textarea.set_cursor_line_style(Style::default());
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        self.textarea.set_block(styled_block(focused));
        frame.render_widget(&self.textarea, area);
    }
}

fn styled_block(focused: bool) -> Block<'static> {
    let border_color = if focused {
        Color::LightBlue
    } else {
        Color::DarkGray
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border_color))
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}
