use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::storage::Database;
use crate::task::TaskDocument;

use super::app::{Screen, ShellState, StatusKind};
use super::prompt::{Checklist, InputPrompt, Menu};

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);

pub fn render<D>(frame: &mut Frame, shell: &ShellState<D>)
where
    D: Database<TaskDocument>,
{
    let area = frame.size();
    let menu_height = shell.menu().entries().len() as u16 + 3;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(menu_height),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, shell, chunks[0]);
    render_tasks(frame, shell, chunks[1]);
    render_menu(frame, shell.menu(), chunks[2]);
    render_footer(frame, shell, chunks[3]);

    match shell.screen() {
        Screen::Menu => {}
        Screen::Add(prompt) => render_input_modal(frame, area, prompt),
        Screen::Complete(checklist) => render_checklist_modal(frame, area, checklist),
    }
}

fn render_header<D>(frame: &mut Frame, shell: &ShellState<D>, area: Rect)
where
    D: Database<TaskDocument>,
{
    let stats = shell.stats();
    let text = format!(
        "Todo Lists (total: {}, incomplete: {}, completed: {})",
        stats.total, stats.incomplete, stats.completed
    );
    let widget = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(widget, area);
}

fn render_tasks<D>(frame: &mut Frame, shell: &ShellState<D>, area: Rect)
where
    D: Database<TaskDocument>,
{
    let tasks = shell.visible_tasks();
    let width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line<'static>> = Vec::new();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    }
    for task in tasks.iter().take(height.max(1)) {
        // Tabs do not render in the terminal buffer; pad instead.
        let mut spans = vec![Span::styled(
            truncate_text(&task.title, width.saturating_sub(13)),
            Style::default().fg(COLOR_TEXT),
        )];
        if task.is_complete {
            spans.push(Span::raw("  "));
            spans.push(Span::styled("(completed)", Style::default().fg(COLOR_SUCCESS)));
        }
        lines.push(Line::from(spans));
    }
    if tasks.len() > height && height > 0 {
        lines.truncate(height.saturating_sub(1));
        lines.push(Line::from(Span::styled(
            format!("... {} more", tasks.len() - lines.len()),
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    }

    let title = if shell.show_completed() {
        "Tasks"
    } else {
        "Tasks (completed hidden)"
    };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title(title),
    );
    frame.render_widget(widget, area);
}

fn render_menu(frame: &mut Frame, menu: &Menu, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, entry) in menu.entries().iter().enumerate() {
        let selected = idx == menu.selected_index();
        let pointer = if selected { "> " } else { "  " };
        let style = if entry.disabled {
            Style::default().fg(COLOR_MUTED_DARK)
        } else if selected {
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(COLOR_TEXT)
        };
        let mut spans = vec![
            Span::styled(pointer, Style::default().fg(COLOR_ACCENT)),
            Span::styled(entry.name, style),
        ];
        if entry.disabled {
            spans.push(Span::styled(" (disabled)", Style::default().fg(COLOR_MUTED_DARK)));
        }
        lines.push(Line::from(spans));
    }

    let description = menu
        .selected_entry()
        .map(|entry| entry.description)
        .unwrap_or_default();
    lines.push(Line::from(Span::styled(
        description,
        Style::default().fg(COLOR_MUTED),
    )));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER))
            .title("Choose Option"),
    );
    frame.render_widget(widget, area);
}

fn render_footer<D>(frame: &mut Frame, shell: &ShellState<D>, area: Rect)
where
    D: Database<TaskDocument>,
{
    let line = match shell.status_line() {
        Some((message, StatusKind::Error)) => Line::from(Span::styled(
            format!("error: {message}"),
            Style::default().fg(COLOR_ERROR),
        )),
        Some((message, StatusKind::Info)) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(COLOR_SUCCESS),
        )),
        None => Line::from(Span::styled(
            "j/k move  enter choose  q quit",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input_modal(frame: &mut Frame, area: Rect, prompt: &InputPrompt) {
    let modal = centered_rect(area.width.saturating_sub(6).min(64), 6, area);
    frame.render_widget(Clear, modal);

    let mut lines = vec![Line::from(vec![
        Span::styled(prompt.message().to_string(), Style::default().fg(COLOR_MUTED)),
        Span::styled(prompt.value().to_string(), Style::default().fg(COLOR_TEXT)),
        Span::styled(
            " ",
            Style::default().add_modifier(Modifier::REVERSED),
        ),
    ])];
    match prompt.error() {
        Some(error) => lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(COLOR_ERROR),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(Span::styled(
        "enter add  ctrl+u clear  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Add Task"))
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, modal);
}

fn render_checklist_modal(frame: &mut Frame, area: Rect, checklist: &Checklist) {
    let content_width = area.width.saturating_sub(6).min(72);
    let max_height = area.height.saturating_sub(4).max(6);
    let list_height = max_height.saturating_sub(4) as usize;
    let modal = centered_rect(content_width, max_height, area);
    frame.render_widget(Clear, modal);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let options = checklist.options();
    if options.is_empty() {
        lines.push(Line::from(Span::styled(
            "No tasks",
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        let selected = checklist.selected_index();
        let (start, end) = list_window(options.len(), selected, list_height.max(1));
        let title_width = (content_width as usize).saturating_sub(8);
        for (idx, option) in options.iter().enumerate().take(end).skip(start) {
            let (marker, marker_style) = if option.checked {
                ("[x]", Style::default().fg(COLOR_SUCCESS))
            } else {
                ("[ ]", Style::default().fg(COLOR_MUTED_DARK))
            };
            let mut spans = vec![
                Span::styled(marker, marker_style),
                Span::raw(" "),
                Span::styled(
                    truncate_text(&option.title, title_width),
                    Style::default().fg(COLOR_TEXT),
                ),
            ];
            if idx == selected {
                for span in &mut spans {
                    span.style = span.style.add_modifier(Modifier::REVERSED);
                }
            }
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "space toggle  a all  enter apply  esc cancel",
        Style::default().fg(COLOR_MUTED_DARK),
    )));
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Mark Task Complete"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Visible `[start, end)` window keeping `selected` on screen
fn list_window(total: usize, selected: usize, height: usize) -> (usize, usize) {
    if total <= height {
        return (0, total);
    }
    let start = selected.saturating_sub(height - 1).min(total - height);
    (start, start + height)
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_window_follows_selection() {
        assert_eq!(list_window(3, 2, 5), (0, 3));
        assert_eq!(list_window(10, 0, 4), (0, 4));
        assert_eq!(list_window(10, 5, 4), (2, 6));
        assert_eq!(list_window(10, 9, 4), (6, 10));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate_text("打扫房间", 10), "打扫房间");
        assert_eq!(truncate_text("abcdefgh", 6), "abc...");
        assert_eq!(truncate_text("abc", 0), "");
    }
}
