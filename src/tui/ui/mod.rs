//! UI module: View components for the TUI.

pub mod patient;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled("Medical Disclaimer: ", MedicalTheme::warning()),
            Span::styled(
                "This prediction tool is designed for clinical decision support only. \
                 Results should not replace professional medical judgment.",
                MedicalTheme::text_muted(),
            ),
        ]),
        Line::from(vec![Span::styled(
            "Always consult with qualified healthcare professionals for diagnosis and treatment decisions.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
