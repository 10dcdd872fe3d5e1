use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane};
use crate::render::{render_message, split_paragraphs, MessageView};
use crate::state::{Lifecycle, Sender};

/// The input box grows with its content up to this many lines, then scrolls
const MAX_INPUT_LINES: u16 = 6;

pub fn render(app: &mut App, frame: &mut Frame) {
    let input_lines = (app.state().input.line_count() as u16).clamp(1, MAX_INPUT_LINES);

    let [header_area, transcript_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_lines + 2),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(app, frame, header_area);
    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" Chat ", Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(app.endpoint.as_str(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn message_lines(view: &MessageView) -> Vec<Line<'static>> {
    let label_color = match (view.sender, view.is_error) {
        (_, true) => Color::Red,
        (Sender::User, false) => Color::Cyan,
        (Sender::Bot, false) => Color::Yellow,
    };
    let text_style = if view.is_error {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{}:", view.label()),
        Style::default().fg(label_color).add_modifier(Modifier::BOLD),
    ))];

    for (i, paragraph) in view.paragraphs.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        for line in paragraph.split('\n') {
            lines.push(Line::from(Span::styled(line.to_string(), text_style)));
        }
    }
    lines.push(Line::default());
    lines
}

fn welcome_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, paragraph) in split_paragraphs(text).iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        for line in paragraph.split('\n') {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

fn busy_lines(lifecycle: Lifecycle, animation_frame: u8) -> Vec<Line<'static>> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((animation_frame as usize) + 1);
    let hint_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
    match lifecycle {
        Lifecycle::Sending => vec![
            Line::from(Span::styled(
                "Bot:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("Thinking{}", dots), hint_style)),
        ],
        Lifecycle::Clearing => vec![Line::from(Span::styled(
            format!("Starting a new chat{}", dots),
            hint_style,
        ))],
        Lifecycle::Idle => Vec::new(),
    }
}

/// Clamp a row or column count into the terminal's coordinate range
fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    app.transcript_area = Some(area);
    // Inner size minus borders, for scroll calculations
    app.transcript_height = area.height.saturating_sub(2);
    app.transcript_width = area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Transcript;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" Conversation ");

    let state = app.state();
    let mut lines: Vec<Line> = Vec::new();

    if state.show_welcome && state.transcript.is_empty() {
        lines.extend(welcome_lines(&app.welcome_text));
    }

    for message in state.transcript.iter() {
        lines.extend(message_lines(&render_message(message)));
    }

    if state.busy {
        lines.extend(busy_lines(state.lifecycle, app.animation_frame));
    }

    // Rows after word wrapping, measured without the borders
    let transcript = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total = to_u16(transcript.line_count(app.transcript_width));
    app.max_scroll = total.saturating_sub(app.transcript_height);
    if app.follow_bottom {
        app.transcript_scroll = app.max_scroll;
    } else {
        app.transcript_scroll = app.transcript_scroll.min(app.max_scroll);
    }

    let transcript = transcript.block(block).scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input = &app.state().input;
    let focused = app.focus == FocusPane::Input;

    let (title, border_color) = if app.state().lifecycle == Lifecycle::Clearing {
        (" Starting new chat ", Color::DarkGray)
    } else if input.is_disabled() {
        (" Waiting for reply ", Color::DarkGray)
    } else if focused {
        (" Message ", Color::Cyan)
    } else {
        (" Message ", Color::White)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_height = area.height.saturating_sub(2).max(1);
    let inner_width = area.width.saturating_sub(2).max(1);
    let (cursor_line, cursor_col) = input.cursor_position();

    // Keep the cursor inside the box; offsets past u16::MAX pin to the end
    let v_scroll = to_u16(cursor_line.saturating_sub(usize::from(inner_height - 1)));
    let h_scroll = to_u16(cursor_col.saturating_sub(usize::from(inner_width - 1)));
    let cursor_y = to_u16(cursor_line.saturating_sub(usize::from(v_scroll))).min(inner_height - 1);
    let cursor_x = to_u16(cursor_col.saturating_sub(usize::from(h_scroll))).min(inner_width - 1);

    let text_style = if input.is_disabled() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(input.text())
        .style(text_style)
        .block(block)
        .scroll((v_scroll, h_scroll));
    frame.render_widget(paragraph, area);

    if focused && !input.is_disabled() {
        frame.set_cursor_position((
            area.x.saturating_add(1).saturating_add(cursor_x),
            area.y.saturating_add(1).saturating_add(cursor_y),
        ));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let send_style = if app.state().input.is_submittable() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let footer = Line::from(vec![
        Span::styled(" Enter", send_style),
        Span::raw(" send  "),
        Span::styled("Shift/Alt+Enter", key_style),
        Span::raw(" newline  "),
        Span::styled("Ctrl+N", key_style),
        Span::raw(" new chat  "),
        Span::styled("Tab", key_style),
        Span::raw(" focus  "),
        Span::styled("Ctrl+C", key_style),
        Span::raw(" quit"),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
