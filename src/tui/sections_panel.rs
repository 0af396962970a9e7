use crate::sections::{enabled_count, OutputSection, OutputSectionId};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Panel listing the eight report sections with their on/off state.
///
/// The panel only tracks the cursor; the section flags themselves live in
/// the `OutputConfig` owned by the app.
pub struct SectionsPanel {
    cursor: usize,
}

impl SectionsPanel {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    /// Section id under the cursor.
    pub fn selected(&self, config: &[OutputSection]) -> Option<OutputSectionId> {
        config.get(self.cursor).map(|s| s.id)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, config: &[OutputSection], focused: bool) {
        let border_color = if focused {
            Color::LightBlue
        } else {
            Color::DarkGray
        };
        let title = format!(
            " 📝 출력 항목 ({}/{} 선택{}) ",
            enabled_count(config),
            config.len(),
            if focused { " │ Space=전환 │ Tab=검색창" } else { "" }
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                title,
                Style::default().fg(Color::LightBlue),
            ))
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = config
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let checkbox = if section.enabled { "[x]" } else { "[ ]" };
                let mut style = if section.enabled {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                if focused && i == self.cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(vec![
                    Span::styled(format!("{checkbox} "), style),
                    Span::styled(format!("{} {} ", section.emoji, section.label), style),
                    Span::styled(
                        format!("— {}", section.description),
                        style.add_modifier(Modifier::DIM),
                    ),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for SectionsPanel {
    fn default() -> Self {
        Self::new()
    }
}
