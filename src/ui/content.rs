//! Lesson content panel
//!
//! Renders [`ContentBlock`]s into styled, word-wrapped lines. Inline
//! `**bold**`, `*em*` and `` `code` `` markers are turned into styles before
//! wrapping so emphasis survives line breaks.

use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use textwrap::Options;

use crate::app::state::AppState;
use crate::course::ContentBlock;
use crate::theme::Theme;

/// Draw the content panel with the active lesson
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme, focused: bool) {
    let border_color = if focused { theme.border_focused } else { theme.border };
    let title = state.active_title().map_or(" Lesson ".to_string(), |t| format!(" {} ", t));

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // One column for the scrollbar, one for padding
    let width = inner.width.saturating_sub(2) as usize;
    let lines = render_blocks(&state.active_blocks, theme, width);

    state.content.total_lines = lines.len();
    state.content.visible_height = inner.height as usize;
    state.content.clamp_scroll();

    let offset = state.content.scroll_offset;
    let visible: Vec<Line> = lines.into_iter().skip(offset).take(inner.height as usize).collect();
    let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
    frame.render_widget(Paragraph::new(visible), text_area);

    if state.content.total_lines > state.content.visible_height {
        let mut scrollbar = ScrollbarState::new(state.content.max_scroll()).position(offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .thumb_style(Style::default().fg(theme.accent_secondary))
                .track_style(Style::default().fg(theme.bg_tertiary)),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar,
        );
    }
}

/// Render content blocks to styled lines
pub fn render_blocks(blocks: &[ContentBlock], theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);
    let mut lines: Vec<Line<'static>> = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Heading { level, text } => {
                let style = match level {
                    1 => Style::default()
                        .fg(theme.heading)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    2 => Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
                    _ => Style::default().fg(theme.fg_secondary).add_modifier(Modifier::BOLD),
                };
                let text = strip_markers(text);
                lines.extend(wrap_plain(&text, width).into_iter().map(|l| Line::styled(l, style)));
            }
            ContentBlock::Paragraph(text) => {
                lines.extend(wrap_segments(&inline_segments(text, theme), width));
            }
            ContentBlock::Code { language, code } => {
                let border = Style::default().fg(theme.border);
                lines.push(Line::from(vec![
                    Span::styled("┌─ ", border),
                    Span::styled(language.clone().unwrap_or_else(|| "code".into()), Style::default().fg(theme.info)),
                ]));
                for line in code.lines() {
                    lines.push(Line::from(vec![
                        Span::styled("│ ", border),
                        Span::styled(line.to_string(), Style::default().fg(theme.code)),
                    ]));
                }
                lines.push(Line::styled("└──", border));
            }
            ContentBlock::List { ordered, items } => {
                for (index, item) in items.iter().enumerate() {
                    let marker = if *ordered { format!("{}. ", index + 1) } else { "• ".to_string() };
                    let indent = " ".repeat(marker.chars().count() + 2);
                    let wrapped = wrap_segments(&inline_segments(item, theme), width.saturating_sub(indent.len()));
                    for (row, line) in wrapped.into_iter().enumerate() {
                        let prefix = if row == 0 {
                            Span::styled(format!("  {marker}"), Style::default().fg(theme.accent_secondary))
                        } else {
                            Span::raw(indent.clone())
                        };
                        let mut spans = vec![prefix];
                        spans.extend(line.spans);
                        lines.push(Line::from(spans));
                    }
                }
            }
            ContentBlock::Blockquote(text) => {
                let style = Style::default().fg(theme.quote).add_modifier(Modifier::ITALIC);
                for line in wrap_plain(&strip_markers(text), width.saturating_sub(2)) {
                    lines.push(Line::from(vec![
                        Span::styled("▎ ", Style::default().fg(theme.accent_secondary)),
                        Span::styled(line, style),
                    ]));
                }
            }
            ContentBlock::Rule => {
                lines.push(Line::styled("─".repeat(width), Style::default().fg(theme.border)));
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

/// Split a paragraph into styled segments at inline markers
fn inline_segments(text: &str, theme: &Theme) -> Vec<(String, Style)> {
    let base = Style::default().fg(theme.fg_primary);
    let mut segments = Vec::new();
    let mut current = String::new();
    let (mut bold, mut italic, mut code) = (false, false, false);
    let mut chars = text.chars().peekable();

    let style_for = |bold: bool, italic: bool, code: bool| {
        if code {
            return Style::default().fg(theme.code).bg(theme.bg_secondary);
        }
        let mut style = base;
        if bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    };

    while let Some(c) = chars.next() {
        let toggle = match c {
            '`' => Some(0),
            '*' if !code && chars.peek() == Some(&'*') => {
                chars.next();
                Some(1)
            }
            '*' if !code => Some(2),
            _ => None,
        };
        let Some(which) = toggle else {
            current.push(c);
            continue;
        };

        if !current.is_empty() {
            segments.push((std::mem::take(&mut current), style_for(bold, italic, code)));
        }
        match which {
            0 => code = !code,
            1 => bold = !bold,
            _ => italic = !italic,
        }
    }
    if !current.is_empty() {
        segments.push((current, style_for(bold, italic, code)));
    }
    segments
}

/// Remove inline markers, keeping the text
fn strip_markers(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '`')).collect()
}

fn wrap_plain(text: &str, width: usize) -> Vec<String> {
    textwrap::wrap(text, Options::new(width.max(1))).into_iter().map(|l| l.into_owned()).collect()
}

/// Word-wrap styled segments, keeping each piece's style
fn wrap_segments(segments: &[(String, Style)], width: usize) -> Vec<Line<'static>> {
    let plain: String = segments.iter().map(|(text, _)| text.as_str()).collect();
    if plain.trim().is_empty() {
        return vec![Line::from("")];
    }

    // Byte ranges of each segment in `plain`
    let mut ranges = Vec::with_capacity(segments.len());
    let mut start = 0;
    for (text, style) in segments {
        ranges.push((start, start + text.len(), *style));
        start += text.len();
    }

    let mut lines = Vec::new();
    let mut cursor = 0;
    for wrapped in textwrap::wrap(&plain, Options::new(width.max(1))) {
        let Some(found) = plain[cursor..].find(wrapped.as_ref()) else {
            lines.push(Line::from(wrapped.into_owned()));
            continue;
        };
        let line_start = cursor + found;
        let line_end = line_start + wrapped.len();
        cursor = line_end;

        let spans: Vec<Span<'static>> = ranges
            .iter()
            .filter(|(seg_start, seg_end, _)| *seg_start < line_end && *seg_end > line_start)
            .map(|(seg_start, seg_end, style)| {
                let from = (*seg_start).max(line_start);
                let to = (*seg_end).min(line_end);
                Span::styled(plain[from..to].to_string(), *style)
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn inline_markers_become_styles() {
        let theme = Theme::default();
        let segments = inline_segments("plain **bold** and `code`", &theme);
        let texts: Vec<&str> = segments.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["plain ", "bold", " and ", "code"]);
        assert!(segments[1].1.add_modifier.contains(Modifier::BOLD));
        assert_eq!(segments[3].1.fg, Some(theme.code));
    }

    #[test]
    fn wrapping_keeps_emphasis_across_lines() {
        let theme = Theme::default();
        let segments = inline_segments("one two **three four five** six", &theme);
        let lines = wrap_segments(&segments, 10);

        assert!(lines.len() > 1);
        let rebuilt: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(rebuilt.join(" "), "one two three four five six");
        let bold_words: Vec<String> = lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.style.add_modifier.contains(Modifier::BOLD))
            .map(|span| span.content.trim().to_string())
            .collect();
        assert!(bold_words.join(" ").contains("four"));
    }

    #[test]
    fn blocks_render_with_spacing() {
        let theme = Theme::default();
        let blocks = vec![
            ContentBlock::Heading { level: 1, text: "Intro".into() },
            ContentBlock::List { ordered: true, items: vec!["first".into(), "second".into()] },
        ];
        let lines = render_blocks(&blocks, &theme, 40);
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["Intro", "", "  1. first", "  2. second", ""]);
    }

    #[test]
    fn code_blocks_are_framed() {
        let theme = Theme::default();
        let blocks = vec![ContentBlock::Code { language: Some("rust".into()), code: "let x = 1;".into() }];
        let texts: Vec<String> = render_blocks(&blocks, &theme, 40).iter().map(text_of).collect();
        assert_eq!(texts[0], "┌─ rust");
        assert_eq!(texts[1], "│ let x = 1;");
    }

    #[test]
    fn empty_paragraph_is_one_blank_line() {
        let theme = Theme::default();
        assert_eq!(wrap_segments(&inline_segments("", &theme), 20).len(), 1);
    }
}
