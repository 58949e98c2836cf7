mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::form::{format_value, Field, Focus};
use crate::predict::{Outcome, Prediction};
use crate::theme::Theme;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the palette. Only the first call has an effect.
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

fn accent() -> Color { theme().accent }
fn danger() -> Color { theme().danger }
fn warning() -> Color { theme().warning }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }
fn bg_selected() -> Color { theme().bg_selected }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let outer = Block::default()
        .title(Span::styled(
            " Diagnóstico Fuzzy de Hipertensão ",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Systolic
            Constraint::Length(3),  // Diastolic
            Constraint::Length(3),  // Age
            Constraint::Length(3),  // Submit
            Constraint::Min(3),     // Results
            Constraint::Length(1),  // Status line
            Constraint::Length(1),  // Footer
        ])
        .split(inner);

    for (i, field) in Field::ALL.into_iter().enumerate() {
        let widget = components::input_field(
            field,
            app.form.buffer(field),
            app.form.input.get(field),
            app.form.focus == Focus::Field(field),
        );
        f.render_widget(widget, chunks[i]);
    }

    let button = components::submit_button(app.is_loading(), app.form.focus == Focus::Submit);
    f.render_widget(button, chunks[3]);

    if let Some(outcome) = app.outcome() {
        draw_results(f, app, outcome, chunks[4]);
    }

    draw_status_line(f, app, chunks[5]);
    draw_footer(f, app, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_results(f: &mut Frame, app: &App, outcome: &Outcome, area: Rect) {
    if let Some(prediction) = outcome.prediction() {
        let partial = matches!(outcome, Outcome::Partial(_));
        let panel = Paragraph::new(result_lines(app, prediction, partial))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(inactive())),
            );
        f.render_widget(panel, area);
    } else if let Some(message) = outcome.error_message() {
        let block_area = Rect { height: area.height.min(3), ..area };
        f.render_widget(components::error_block(message), block_area);
    }
}

fn result_lines<'a>(app: &App, prediction: &'a Prediction, partial: bool) -> Vec<Line<'a>> {
    let label_style = Style::default().fg(text()).add_modifier(Modifier::BOLD);
    let score = prediction.valor_risco.map(format_value).unwrap_or_default();

    let mut lines = vec![
        Line::from(Span::styled("Resultado:", label_style)),
        Line::from(components::badge(prediction.label.as_deref())),
        Line::from(vec![
            Span::styled("Score: ", label_style),
            Span::styled(score, Style::default().fg(text())),
        ]),
        Line::from(vec![
            Span::styled("Sugestão: ", label_style),
            Span::styled(
                prediction.sugestao.as_deref().unwrap_or_default(),
                Style::default().fg(text()),
            ),
        ]),
    ];

    if partial {
        lines.push(Line::from(Span::styled(
            "Resposta incompleta do serviço",
            Style::default().fg(warning()),
        )));
    }

    // The service clips inputs to its own ranges; show what it actually used
    if let (Some(echoed), Some(sent)) = (prediction.entrada, app.last_sent) {
        if echoed.differs_from(&sent) {
            lines.push(Line::from(Span::styled(
                format!(
                    "Valores considerados: {} / {} mmHg, {} anos",
                    format_value(echoed.pressao_sistolica),
                    format_value(echoed.pressao_diastolica),
                    format_value(echoed.idade),
                ),
                Style::default().fg(text_dim()),
            )));
        }
    }

    lines
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(warning())))
    } else if app.is_loading() {
        Line::from(Span::styled("Aguardando o serviço...", Style::default().fg(text_dim())))
    } else {
        let out_of_range = app.form.input.out_of_range();
        if out_of_range.is_empty() {
            Line::from(Span::styled("Pronto", Style::default().fg(text_dim())))
        } else {
            Line::from(Span::styled(
                "Valores fora da faixa recomendada serão enviados mesmo assim",
                Style::default().fg(warning()),
            ))
        }
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(accent()));
    let desc = |d: &'static str| Span::styled(d, Style::default().fg(text_dim()));

    let footer = Paragraph::new(Line::from(vec![
        key("Tab"),
        desc(" campo  "),
        key("Enter"),
        desc(" avaliar  "),
        key("?"),
        desc(" ajuda  "),
        key("q"),
        desc(" sair  │ "),
        Span::styled(app.endpoint().to_string(), Style::default().fg(inactive())),
    ]));
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        ))
    };
    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Formulário ═══"),
        entry("  Tab/↓       ", "Próximo campo"),
        entry("  Shift-Tab/↑ ", "Campo anterior"),
        entry("  0-9 . -     ", "Editar o valor do campo"),
        entry("  Backspace   ", "Apagar"),
        entry("  Ctrl-R      ", "Restaurar valores padrão (120 / 80 / 30)"),
        Line::from(""),
        section("═══ Avaliação ═══"),
        entry("  Enter       ", "Enviar os valores ao serviço"),
        Line::from(Span::styled(
            "              Faixas indicadas são apenas recomendações",
            Style::default().fg(text_dim()),
        )),
        Line::from(""),
        section("═══ Geral ═══"),
        entry("  ?/F1        ", "Mostrar/ocultar esta ajuda"),
        entry("  q/Ctrl-C    ", "Sair"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Ajuda ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::components::badge_style;
    use crate::app::Phase;
    use crate::predict::{EchoedInput, PredictionClient, CONNECTION_ERROR};
    use crate::risk::RiskStyle;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn app() -> App {
        App::new(PredictionClient::new("http://127.0.0.1:9/predict", None).unwrap())
    }

    fn render(app: &App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn rows(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn screen(buf: &Buffer) -> String {
        rows(buf).join("\n")
    }

    /// Cell position of the first occurrence of `needle`
    fn find(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
        rows(buf).iter().enumerate().find_map(|(y, row)| {
            row.find(needle)
                .map(|idx| (row[..idx].chars().count() as u16, y as u16))
        })
    }

    fn alto() -> Prediction {
        Prediction {
            valor_risco: Some(42.0),
            label: Some("ALTO".to_string()),
            sugestao: Some("Consulte um médico".to_string()),
            entrada: None,
        }
    }

    #[test]
    fn test_idle_shows_defaults_and_no_results() {
        let buf = render(&app());
        let screen = screen(&buf);
        assert!(screen.contains("120"));
        assert!(screen.contains("80"));
        assert!(screen.contains("30"));
        assert!(screen.contains("Avaliar"));
        assert!(!screen.contains("Resultado:"));
    }

    #[test]
    fn test_loading_disables_button() {
        let mut app = app();
        app.phase = Phase::Loading;
        let screen = screen(&render(&app));
        assert!(screen.contains("Calculando..."));
        assert!(!screen.contains("Avaliar"));
        assert!(!screen.contains("Resultado:"));
    }

    #[test]
    fn test_success_renders_score_badge_and_suggestion() {
        let mut app = app();
        app.phase = Phase::Settled(Outcome::Success(alto()));
        let buf = render(&app);
        let screen = screen(&buf);

        assert!(screen.contains("Score: 42"));
        assert!(!screen.contains("Score: 42."));
        assert!(screen.contains("Sugestão: Consulte um médico"));

        let (x, y) = find(&buf, "ALTO").unwrap();
        let expected = badge_style(RiskStyle::High);
        assert_eq!(buf[(x, y)].bg, expected.bg.unwrap());
        assert_eq!(buf[(x, y)].fg, expected.fg.unwrap());
    }

    #[test]
    fn test_failure_shows_only_fixed_message() {
        let mut app = app();
        app.phase = Phase::Settled(Outcome::connection_error());
        let buf = render(&app);
        let screen = screen(&buf);

        assert!(screen.contains(CONNECTION_ERROR));
        assert!(!screen.contains("Score"));
        assert!(!screen.contains("Sugestão"));
        assert!(!screen.contains("Resultado:"));

        let (x, y) = find(&buf, CONNECTION_ERROR).unwrap();
        assert_eq!(buf[(x, y)].fg, danger());
    }

    #[test]
    fn test_partial_replaces_previous_result() {
        let mut app = app();
        app.phase = Phase::Settled(Outcome::Success(alto()));
        let _ = render(&app);

        app.phase = Phase::Settled(Outcome::Partial(Prediction {
            label: Some("BAIXO".to_string()),
            ..Default::default()
        }));
        let buf = render(&app);
        let screen = screen(&buf);

        assert!(screen.contains("BAIXO"));
        assert!(!screen.contains("42"));
        assert!(!screen.contains("Consulte um médico"));
        assert!(!screen.contains("ALTO"));
        assert!(screen.contains("Resposta incompleta"));

        let (x, y) = find(&buf, "BAIXO").unwrap();
        assert_eq!(buf[(x, y)].bg, badge_style(RiskStyle::Low).bg.unwrap());
    }

    #[test]
    fn test_unrecognized_label_is_neutral() {
        let mut app = app();
        app.phase = Phase::Settled(Outcome::Success(Prediction {
            label: Some("DESCONHECIDO".to_string()),
            ..alto()
        }));
        let buf = render(&app);
        let (x, y) = find(&buf, "DESCONHECIDO").unwrap();
        assert_eq!(buf[(x, y)].bg, badge_style(RiskStyle::Neutral).bg.unwrap());
    }

    #[test]
    fn test_clipped_values_are_shown() {
        let mut app = app();
        app.last_sent = Some(crate::form::FormInput {
            systolic: 240.0,
            diastolic: 80.0,
            age: 30.0,
        });
        app.phase = Phase::Settled(Outcome::Success(Prediction {
            entrada: Some(EchoedInput {
                pressao_sistolica: 200.0,
                pressao_diastolica: 80.0,
                idade: 30.0,
            }),
            ..alto()
        }));
        let screen = screen(&render(&app));
        assert!(screen.contains("Valores considerados: 200 / 80 mmHg, 30 anos"));
    }

    #[test]
    fn test_rejected_shows_service_message() {
        let mut app = app();
        app.phase = Phase::Settled(Outcome::Rejected {
            status: 500,
            message: "Erro ao calcular o sistema fuzzy.".to_string(),
        });
        let screen = screen(&render(&app));
        assert!(screen.contains("Erro ao calcular o sistema fuzzy."));
        assert!(!screen.contains("Score"));
    }

    #[test]
    fn test_help_popup() {
        let mut app = app();
        app.popup = Popup::Help;
        let screen = screen(&render(&app));
        assert!(screen.contains("Ajuda"));
        assert!(screen.contains("Restaurar valores padrão"));
    }
}
