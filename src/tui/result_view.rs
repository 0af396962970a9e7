use crate::provider::StockSearchResult;
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use textwrap::wrap;

/// Scrollable view over one completed snapshot.
///
/// Markdown stays markdown; the view only applies light line-level styling
/// (headings, quotes, rules) so tables and bullets read cleanly in a
/// terminal.
pub struct ResultView {
    scroll_offset: u16,
    content_height: u16,
    viewport_height: u16,
}

impl ResultView {
    pub fn new() -> Self {
        Self {
            scroll_offset: 0,
            content_height: 0,
            viewport_height: 0,
        }
    }

    /// Reset scroll position for a fresh result.
    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self
            .content_height
            .saturating_sub(self.viewport_height.max(1));
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, result: &StockSearchResult) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled(
                " 📸 스냅샷 (↑↓=스크롤 │ Esc=새 검색) ",
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.saturating_sub(2).max(10) as usize;
        let mut lines = meta_lines(result);
        lines.push(Line::default());
        lines.extend(markdown_lines(&result.content, width));

        if let Some(sources) = &result.sources {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "📎 출처",
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            )));
            for source in sources {
                let label = if source.title.is_empty() {
                    source.url.clone()
                } else {
                    format!("{} — {}", source.title, source.url)
                };
                for wrapped in wrap(&format!("• {label}"), width) {
                    lines.push(Line::from(Span::styled(
                        wrapped.to_string(),
                        Style::default().fg(Color::Green),
                    )));
                }
            }
        }

        self.content_height = lines.len() as u16;
        self.viewport_height = inner.height;
        let max = self
            .content_height
            .saturating_sub(self.viewport_height.max(1));
        self.scroll_offset = self.scroll_offset.min(max);

        let paragraph = Paragraph::new(lines).scroll((self.scroll_offset, 0));
        frame.render_widget(paragraph, inner);
    }
}

impl Default for ResultView {
    fn default() -> Self {
        Self::new()
    }
}

fn meta_lines(result: &StockSearchResult) -> Vec<Line<'static>> {
    let created = DateTime::parse_from_rfc3339(&result.created_at)
        .map(|t| {
            t.with_timezone(&Local)
                .format("%m월 %d일 %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| result.created_at.clone());

    vec![Line::from(vec![
        Span::styled(
            format!("🔍 {}", result.query),
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  ·  {}", result.provider.label(), created),
            Style::default().fg(Color::DarkGray),
        ),
    ])]
}

fn markdown_lines(content: &str, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for raw in content.lines() {
        let style = line_style(raw);
        if raw.trim().is_empty() {
            lines.push(Line::default());
            continue;
        }
        // Table rows keep their own layout; wrapping would break columns.
        if raw.trim_start().starts_with('|') {
            lines.push(Line::from(Span::styled(raw.to_string(), style)));
            continue;
        }
        for wrapped in wrap(raw, width) {
            lines.push(Line::from(Span::styled(wrapped.to_string(), style)));
        }
    }
    lines
}

fn line_style(raw: &str) -> Style {
    let trimmed = raw.trim_start();
    if trimmed.starts_with("## ") {
        Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD)
    } else if trimmed.starts_with("### ") {
        Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD)
    } else if trimmed.starts_with('>') {
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC)
    } else if trimmed.starts_with("---") {
        Style::default().fg(Color::DarkGray)
    } else if trimmed.starts_with('*') && trimmed.ends_with('*') {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Animated loading indicator shown while a request is in flight.
pub fn render_loading(frame: &mut Frame, area: Rect, spinner_frame: usize) {
    const DOTS: [&str; 4] = ["·  ", "·· ", "···", "   "];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let dots = DOTS[spinner_frame % DOTS.len()];
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            format!("AI가 분석 중입니다{dots}"),
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
        Line::from(Span::styled(
            "응답 시간은 공급자 상태에 따라 달라질 수 있습니다.",
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Error panel with a retry hint.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(
            " ⚠️  오류 ",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Color::LightRed));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(2).max(10) as usize;
    let mut lines: Vec<Line> = wrap(message, width)
        .into_iter()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::White))))
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Esc=돌아가기 │ 검색어나 API Key를 확인한 뒤 다시 시도하세요.",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}
