//! Rendering logic for each TUI pane

use crate::machine::state::{ACCU, IAR};
use crate::machine::to_signed;
use crate::timeline::{Timeline, TimelineEvent};
use crate::ui::theme::DEFAULT_THEME;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const MNEMONICS: [&str; 15] = [
    "LDC", "LDV", "STV", "ADD", "AND", "OR", "XOR", "EQL", "JMP", "JMN", "LDIV", "STIV", "HALT",
    "NOT", "RAR",
];

/// Human-readable name of a cell address (registers get their names).
pub fn cell_name(timeline: &Timeline, address: i32) -> String {
    match address {
        IAR => "IAR".to_string(),
        ACCU => "ACCU".to_string(),
        _ => match timeline.name_for(address) {
            Some(label) => format!("{} (0x{:05X})", label, address),
            None => format!("0x{:05X}", address),
        },
    }
}

/// Simple syntax highlighting for one line of Mima assembly
fn highlight_asm_line(line: &str) -> Line<'_> {
    let mut spans = Vec::new();

    // Comments swallow the rest of the line.
    let (code, comment) = match line.find(';') {
        Some(i) => line.split_at(i),
        None => (line, ""),
    };

    let mut rest = code;
    while !rest.is_empty() {
        let blank_len = rest.len() - rest.trim_start().len();
        if blank_len > 0 {
            spans.push(Span::raw(&rest[..blank_len]));
            rest = &rest[blank_len..];
            continue;
        }

        let word_len = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        let word = &rest[..word_len];

        let style = if word.ends_with(':') {
            Style::default().fg(DEFAULT_THEME.label)
        } else if MNEMONICS.contains(&word.to_ascii_uppercase().as_str())
            || word.eq_ignore_ascii_case("DS")
        {
            Style::default().fg(DEFAULT_THEME.keyword)
        } else if word.starts_with(|c: char| c.is_ascii_digit() || c == '-')
            || word.starts_with("0x")
        {
            Style::default().fg(DEFAULT_THEME.number)
        } else if word == "*" || word == "=" {
            Style::default().fg(DEFAULT_THEME.secondary)
        } else {
            Style::default().fg(DEFAULT_THEME.fg)
        };

        spans.push(Span::styled(word, style));
        rest = &rest[word_len..];
    }

    if !comment.is_empty() {
        spans.push(Span::styled(
            comment,
            Style::default().fg(DEFAULT_THEME.comment),
        ));
    }

    Line::from(spans)
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused {
            DEFAULT_THEME.border_focused
        } else {
            DEFAULT_THEME.border_normal
        }))
}

/// Render the source pane with the current command's line highlighted.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    current_line: Option<usize>,
    focused: bool,
    scroll: &mut usize,
) {
    let lines: Vec<&str> = source.lines().collect();
    let visible = area.height.saturating_sub(2) as usize;

    // Keep the current line in view when stepping.
    if let Some(line) = current_line {
        let row = line.saturating_sub(1);
        if row < *scroll || row >= *scroll + visible.max(1) {
            *scroll = row.saturating_sub(visible / 2);
        }
    }
    *scroll = (*scroll).min(lines.len().saturating_sub(1));

    let items: Vec<ListItem> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible)
        .map(|(i, text)| {
            let number = Span::styled(
                format!("{:>4} ", i + 1),
                Style::default().fg(DEFAULT_THEME.comment),
            );
            let mut line = highlight_asm_line(text);
            line.spans.insert(0, number);
            let item = ListItem::new(line);
            if Some(i + 1) == current_line {
                item.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(pane_block("Source", focused)), area);
}

/// Render the memory pane: one row per defined or touched address.
///
/// Code rows show their disassembly; rows whose cell was written by the most
/// recent navigation are highlighted.
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    timeline: &Timeline,
    changed: &[i32],
    focused: bool,
    scroll: &mut usize,
) {
    let addresses = timeline.memory_addresses();
    let visible = area.height.saturating_sub(2) as usize;
    *scroll = (*scroll).min(addresses.len().saturating_sub(1));

    let items: Vec<ListItem> = addresses
        .iter()
        .skip(*scroll)
        .take(visible)
        .map(|&address| {
            let value = timeline.get(address);
            let touched = changed.contains(&address);

            let value_style = if touched {
                Style::default()
                    .fg(DEFAULT_THEME.changed)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.number)
            };

            let mut spans = vec![
                Span::styled(
                    format!("0x{:05X}  ", address),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::styled(format!("0x{:06X}", value), value_style),
                Span::styled(
                    format!(" {:>9}  ", to_signed(value)),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
            ];

            if let Some(label) = timeline.name_for(address) {
                spans.push(Span::styled(
                    format!("{}: ", label),
                    Style::default().fg(DEFAULT_THEME.label),
                ));
            }

            if let Some(command) = timeline
                .commands()
                .iter()
                .find(|command| command.address == address)
            {
                spans.push(Span::styled(
                    command.instruction.to_string(),
                    Style::default().fg(DEFAULT_THEME.keyword),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(items).block(pane_block("Memory", focused)), area);
}

/// Render the registers pane: ACCU, IAR, cursor position, current command.
pub fn render_registers_pane(frame: &mut Frame, area: Rect, timeline: &Timeline, focused: bool) {
    let accu = timeline.get(ACCU);
    let iar = timeline.get(IAR);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("ACCU  ", Style::default().fg(DEFAULT_THEME.register)),
            Span::styled(
                format!("0x{:06X}", accu),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::styled(
                format!("  ({})", to_signed(accu)),
                Style::default().fg(DEFAULT_THEME.fg),
            ),
        ]),
        Line::from(vec![
            Span::styled("IAR   ", Style::default().fg(DEFAULT_THEME.register)),
            Span::styled(
                format!("0x{:05X}", iar),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::styled(
                match timeline.name_for(iar) {
                    Some(label) => format!("  → {}", label),
                    None => String::new(),
                },
                Style::default().fg(DEFAULT_THEME.label),
            ),
        ]),
        Line::from(vec![
            Span::styled("Step  ", Style::default().fg(DEFAULT_THEME.register)),
            Span::styled(
                format!("{} / {}", timeline.position(), timeline.count_steps()),
                Style::default().fg(DEFAULT_THEME.fg),
            ),
        ]),
        Line::raw(""),
    ];

    match timeline.find_current_command() {
        Some(command) => lines.push(Line::from(vec![
            Span::styled("Next  ", Style::default().fg(DEFAULT_THEME.register)),
            Span::styled(
                command.instruction.to_string(),
                Style::default().fg(DEFAULT_THEME.keyword),
            ),
        ])),
        None => lines.push(Line::from(Span::styled(
            "Halted (no command at IAR)",
            Style::default().fg(DEFAULT_THEME.success),
        ))),
    }

    frame.render_widget(
        Paragraph::new(lines).block(pane_block("Registers", focused)),
        area,
    );
}

/// Render the trace pane: the notifications emitted by recent navigation.
pub fn render_trace_pane(
    frame: &mut Frame,
    area: Rect,
    timeline: &Timeline,
    trace: &[TimelineEvent],
    focused: bool,
    scroll: &mut usize,
) {
    let visible = area.height.saturating_sub(2) as usize;

    // Pin to the newest events unless the user scrolled up.
    let max_scroll = trace.len().saturating_sub(visible);
    *scroll = (*scroll).min(max_scroll);

    let items: Vec<ListItem> = trace
        .iter()
        .skip(max_scroll - *scroll)
        .take(visible)
        .map(|event| match event {
            TimelineEvent::CellChanged { address, value } => ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} := ", cell_name(timeline, *address)),
                    Style::default().fg(DEFAULT_THEME.fg),
                ),
                Span::styled(
                    format!("0x{:06X} ({})", value, to_signed(*value)),
                    Style::default().fg(DEFAULT_THEME.number),
                ),
            ])),
            TimelineEvent::CursorMoved { position } => ListItem::new(Line::from(Span::styled(
                format!("— step {} —", position),
                Style::default().fg(DEFAULT_THEME.comment),
            ))),
        })
        .collect();

    frame.render_widget(List::new(items).block(pane_block("Trace", focused)), area);
}

/// Render the status bar at the bottom.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    position: usize,
    total: usize,
    is_playing: bool,
) {
    let layout = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Percentage(50),
            ratatui::layout::Constraint::Percentage(50),
        ])
        .split(area);

    let left_spans = vec![
        Span::styled(
            format!(" Step {}/{} ", position, total),
            Style::default()
                .bg(if is_playing {
                    DEFAULT_THEME.secondary
                } else {
                    DEFAULT_THEME.primary
                })
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(message, Style::default().fg(DEFAULT_THEME.fg)),
    ];

    let right_spans = vec![Span::styled(
        "←/→ step  PgUp/PgDn ±10  Home/End ends  Space play  Tab focus  q quit ",
        Style::default().fg(DEFAULT_THEME.comment),
    )];

    frame.render_widget(Paragraph::new(Line::from(left_spans)), layout[0]);
    frame.render_widget(
        Paragraph::new(Line::from(right_spans)).alignment(Alignment::Right),
        layout[1],
    );
}
