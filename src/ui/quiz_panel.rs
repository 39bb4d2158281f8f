//! Quiz overlay: questions, per-answer feedback and results

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::layout::centered_rect;
use crate::app::state::AppState;
use crate::progress::WriteState;
use crate::quiz::{QuizOutcome, QuizPhase, QuizSession};
use crate::theme::Theme;

/// Draw the quiz panel as a centered overlay
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(session) = &state.quiz else {
        return;
    };

    let overlay_area = centered_rect(70, 70, area);
    frame.render_widget(Clear, overlay_area);

    let title = match session.phase() {
        QuizPhase::Finished => " Quiz Results ".to_string(),
        _ => format!(" {} ", session.quiz().title),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_secondary));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    match session.outcome() {
        Some(outcome) => draw_results(frame, inner, session, outcome, state, theme),
        None => draw_question(frame, inner, session, theme),
    }
}

fn draw_question(frame: &mut Frame, area: Rect, session: &QuizSession, theme: &Theme) {
    let question = session.current_question();
    let feedback = session.feedback();

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(
                    "Question {} of {}",
                    session.current_question_index() + 1,
                    session.total_questions()
                ),
                Style::default().fg(theme.fg_muted),
            ),
            Span::styled(
                format!("    difficulty: {}", session.performance_level().label()),
                Style::default().fg(theme.info),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            question.question_text.clone(),
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (index, option) in question.options.iter().enumerate() {
        let selected = session.selected_option() == Some(index);
        let marker = if selected { "●" } else { "○" };
        let style = option_style(index, selected, feedback.is_some(), question.correct_option_index, theme);
        lines.push(Line::from(Span::styled(format!("  {} {}) {}", marker, index + 1, option), style)));
    }

    lines.push(Line::from(""));
    match feedback {
        Some(answer) if answer.correct => lines.push(Line::from(Span::styled(
            "Correct!",
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        ))),
        Some(_) => lines.push(Line::from(Span::styled(
            format!("Not quite. The answer is {}.", question.correct_option_index + 1),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ))),
        None => {}
    }
    lines.push(Line::from(""));

    let hint = if feedback.is_none() {
        "[j/k or 1-9] Select    [Enter] Submit    [Esc] Abandon"
    } else if session.is_last_question() {
        "[Enter] See results"
    } else {
        "[Enter] Next question"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(theme.fg_muted))));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

/// Style of an option; after submitting, the right answer and a wrong pick are colored
fn option_style(
    index: usize,
    selected: bool,
    answered: bool,
    correct_index: usize,
    theme: &Theme,
) -> Style {
    if answered && index == correct_index {
        Style::default().fg(theme.success).add_modifier(Modifier::BOLD)
    } else if answered && selected {
        Style::default().fg(theme.error)
    } else if selected {
        Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg_secondary)
    }
}

fn draw_results(
    frame: &mut Frame,
    area: Rect,
    session: &QuizSession,
    outcome: &QuizOutcome,
    state: &AppState,
    theme: &Theme,
) {
    let headline_style = if outcome.passed { theme.success } else { theme.error };
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            headline(outcome, session.quiz().passing_score),
            Style::default().fg(headline_style).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let marks: Vec<Span> = session
        .answers()
        .iter()
        .map(|answer| {
            let (mark, color) = if answer.correct { ("✓", theme.success) } else { ("✗", theme.error) };
            Span::styled(format!(" Q{}{} ", answer.question_index + 1, mark), Style::default().fg(color))
        })
        .collect();
    lines.push(Line::from(marks));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Final difficulty: {}", outcome.performance_level.label()),
        Style::default().fg(theme.info),
    )));
    lines.push(Line::from(""));

    let (save_text, save_color) = match &state.write_state {
        WriteState::Pending => ("Saving…".to_string(), theme.warning),
        WriteState::Failed(reason) if state.unsaved => {
            (format!("Not saved: {reason}. [r] Retry"), theme.error)
        }
        WriteState::Committed => ("Saved".to_string(), theme.success),
        _ => (String::new(), theme.fg_muted),
    };
    lines.push(Line::from(Span::styled(save_text, Style::default().fg(save_color))));
    lines.push(Line::from(""));

    let hint = if outcome.passed { "[Enter] Continue" } else { "[t] Retake    [Esc] Back to lesson" };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(theme.fg_muted))));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        area,
    );
}

/// One-line summary of an attempt
fn headline(outcome: &QuizOutcome, passing_score: u32) -> String {
    let verdict = if outcome.passed { "Passed" } else { "Not passed" };
    format!(
        "{}: {:.0}% ({}/{} correct, {}% needed)",
        verdict, outcome.score, outcome.correct, outcome.total, passing_score
    )
}
