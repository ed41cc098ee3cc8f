//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::Prediction;
use crate::tui::styles::MedicalTheme;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    #[default]
    Idle,
    Complete {
        prediction: Prediction,
    },
    Error {
        message: String,
    },
}

/// Render the result screen
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => {}
        ResultState::Complete { prediction } => render_prediction(f, chunks[1], prediction),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction Results", MedicalTheme::title()),
        Span::styled(" │ Random Forest Classifier", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_prediction(f: &mut Frame, area: Rect, prediction: &Prediction) {
    let outcome = prediction.outcome;
    let outcome_style = MedicalTheme::outcome(outcome);

    let block = Block::default()
        .title(Span::styled(" Survival Prediction ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(outcome_style);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Headline + caption
            Constraint::Length(3), // Gauge
            Constraint::Length(4), // Interpretation
            Constraint::Length(5), // Metrics
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let percent = prediction.result.confidence_percent();
    let headline = Paragraph::new(vec![
        Line::from(Span::styled(
            outcome.headline(),
            outcome_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("{}: ", outcome.confidence_caption()),
                MedicalTheme::text_secondary(),
            ),
            Span::styled(format!("{percent:.1}%"), MedicalTheme::text()),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::confidence_gauge(
            outcome,
            prediction.result.confidence,
        ))
        .ratio(prediction.result.confidence.clamp(0.0, 1.0))
        .label(format!("{percent:.1}%"));
    f.render_widget(gauge, chunks[1]);

    let interpretation = Paragraph::new(Span::styled(
        outcome.interpretation(),
        MedicalTheme::text(),
    ))
    .wrap(Wrap { trim: true });
    f.render_widget(interpretation, chunks[2]);

    render_metrics(f, chunks[3], prediction);
}

fn render_metrics(f: &mut Frame, area: Rect, prediction: &Prediction) {
    let summary = &prediction.summary;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let metrics = [
        ("Treatment Delay", format!("{} days", summary.treatment_delay_days)),
        ("Patient Age", format!("{} years", summary.age)),
        ("Cancer Stage", summary.cancer_stage.to_string()),
    ];

    for ((label, value), column) in metrics.into_iter().zip(columns.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            MedicalTheme::text().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(Span::styled(format!(" {label} "), MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(card, *column);
    }
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Prediction ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back to Form ", MedicalTheme::key_desc()),
        Span::styled("[Ctrl-Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
