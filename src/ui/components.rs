//! Reusable widgets: numeric input boxes, the submit button and risk badges.

use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{accent, bg_selected, danger, header, inactive, text, text_dim, theme, warning};
use crate::form::{format_value, Field};
use crate::risk::{style_for_opt, RiskStyle};

pub fn badge_style(style: RiskStyle) -> Style {
    let colors = theme().badge(style);
    Style::default()
        .fg(colors.fg)
        .bg(colors.bg)
        .add_modifier(Modifier::BOLD)
}

/// Pill-shaped label; a missing label renders as an empty neutral badge
pub fn badge(label: Option<&str>) -> Span<'static> {
    let style = badge_style(style_for_opt(label));
    Span::styled(format!(" {} ", label.unwrap_or_default()), style)
}

/// Bordered numeric input. Bounds are shown as a hint and never enforced.
pub fn input_field(field: Field, buffer: &str, value: f64, focused: bool) -> Paragraph<'static> {
    let border = if focused { accent() } else { inactive() };
    let title_style = if focused {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(header())
    };

    let (min, max) = field.bounds();
    let range = format!("{}–{}", format_value(min), format_value(max));
    let hint = if buffer.is_empty() {
        Span::styled("  campo obrigatório", Style::default().fg(warning()))
    } else if !field.in_range(value) {
        Span::styled(format!("  fora da faixa {}", range), Style::default().fg(warning()))
    } else {
        Span::styled(format!("  {}", range), Style::default().fg(text_dim()))
    };

    let cursor = if focused { "_" } else { "" };
    let line = Line::from(vec![
        Span::styled(format!("{}{}", buffer, cursor), Style::default().fg(text())),
        hint,
    ]);

    let style = if focused {
        Style::default().bg(bg_selected())
    } else {
        Style::default()
    };

    Paragraph::new(line).style(style).block(
        Block::default()
            .title(Span::styled(format!(" {} * ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    )
}

/// Submit control. Rendered disabled while a request is in flight.
pub fn submit_button(loading: bool, focused: bool) -> Paragraph<'static> {
    let (label, style, border) = if loading {
        (
            "Calculando...",
            Style::default().fg(inactive()).add_modifier(Modifier::DIM),
            inactive(),
        )
    } else if focused {
        (
            "Avaliar",
            Style::default()
                .fg(text())
                .bg(accent())
                .add_modifier(Modifier::BOLD),
            accent(),
        )
    } else {
        ("Avaliar", Style::default().fg(accent()).add_modifier(Modifier::BOLD), inactive())
    };

    Paragraph::new(Line::from(Span::styled(format!(" {} ", label), style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
}

/// Red message block that replaces the results panel
pub fn error_block(message: &str) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(danger()),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(danger())),
    )
}
