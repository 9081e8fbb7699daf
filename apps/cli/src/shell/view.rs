//! Shell layout

use super::{Focus, Shell};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use savant_core::{Generate, Status};

const HELP: &str = "Tab focus · Ctrl+S submit · Ctrl+R reset · PgUp/PgDn scroll · Esc quit";

/// Draw the whole shell.
pub fn render<G: Generate>(frame: &mut Frame, shell: &Shell<G>) {
    let [expertise, question, response, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(7),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let form = shell.assistant().form();
    let focus = shell.focus();
    render_input(frame, expertise, " Expertise ", &form.expertise, focus == Focus::Expertise);
    render_input(frame, question, " Question ", &form.question, focus == Focus::Question);
    render_response(frame, response, form.response(), shell.scroll_back());
    render_status(frame, status, shell);
}

fn render_input(frame: &mut Frame, area: Rect, title: &str, text: &str, focused: bool) {
    let mut block = Block::bordered().title(title);
    if focused {
        block = block.border_style(Style::new().fg(Color::Yellow));
    }
    let inner = block.inner(area);

    // only the tail is drawn so the cursor line stays visible
    let lines = text.split('\n').collect::<Vec<_>>();
    let hidden = lines.len().saturating_sub(usize::from(inner.height.max(1)));
    let shown = &lines[hidden..];
    frame.render_widget(Paragraph::new(shown.join("\n")).block(block), area);

    if focused {
        let last = shown.last().copied().unwrap_or_default();
        let column = u16::try_from(last.chars().count()).unwrap_or(u16::MAX);
        let row = u16::try_from(shown.len().saturating_sub(1)).unwrap_or(u16::MAX);
        let x = inner.x + column.min(inner.width.saturating_sub(1));
        let y = inner.y + row.min(inner.height.saturating_sub(1));
        frame.set_cursor_position((x, y));
    }
}

fn render_response(frame: &mut Frame, area: Rect, text: &str, scroll_back: u16) {
    let block = Block::bordered().title(" Response ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner.width);
    let bottom = rows.saturating_sub(usize::from(inner.height));
    let offset = u16::try_from(bottom)
        .unwrap_or(u16::MAX)
        .saturating_sub(scroll_back);
    frame.render_widget(paragraph.scroll((offset, 0)), inner);
}

fn render_status<G: Generate>(frame: &mut Frame, area: Rect, shell: &Shell<G>) {
    let (label, style) = match shell.assistant().status() {
        Status::Ready => ("ready".to_string(), Style::new().fg(Color::Green)),
        Status::Generating => ("generating…".to_string(), Style::new().fg(Color::Cyan)),
        Status::Done => ("done".to_string(), Style::new().fg(Color::Green)),
        Status::Failed(error) => (format!("error: {error}"), Style::new().fg(Color::Red)),
    };
    let submit = if shell.assistant().form().can_submit() {
        Style::new().add_modifier(Modifier::BOLD)
    } else {
        Style::new().add_modifier(Modifier::DIM)
    };

    let line = Line::from(vec![
        Span::styled(" [submit] ", submit),
        Span::styled(label, style),
        Span::raw("  "),
        Span::styled(HELP, Style::new().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
