//! Patient data input form.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    Asthma, CancerStage, Gender, PatientInput, SmokingStatus, TreatmentType, AGE_RANGE, BMI_RANGE,
    CHOLESTEROL_RANGE,
};
use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field positions in form order.
const GENDER: usize = 0;
const AGE: usize = 1;
const BMI: usize = 2;
const CHOLESTEROL: usize = 3;
const SMOKING: usize = 4;
const ASTHMA: usize = 5;
const DIAGNOSIS_DATE: usize = 6;
const TREATMENT_END_DATE: usize = 7;
const CANCER_STAGE: usize = 8;
const TREATMENT_TYPE: usize = 9;

/// Value held by a form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// One of a fixed set of labels, cycled with ←/→
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
    /// Free text (numbers and dates)
    Text(String),
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: String,
    pub value: FieldValue,
}

impl FormField {
    fn choice(label: &'static str, options: Vec<&'static str>, current: &str) -> Self {
        let selected = options.iter().position(|o| *o == current).unwrap_or(0);
        Self {
            label,
            hint: "←/→ to change".to_string(),
            value: FieldValue::Choice { options, selected },
        }
    }

    fn text(label: &'static str, hint: String, value: String) -> Self {
        Self {
            label,
            hint,
            value: FieldValue::Text(value),
        }
    }

    fn display(&self) -> &str {
        match &self.value {
            FieldValue::Choice { options, selected } => options[*selected],
            FieldValue::Text(s) => s,
        }
    }
}

fn labels<T: Copy>(all: &[T], label: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(label).collect()
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self::from_input(&PatientInput::default())
    }
}

impl PatientFormState {
    /// Build a form pre-filled from an existing input.
    #[must_use]
    pub fn from_input(input: &PatientInput) -> Self {
        let fields = vec![
            FormField::choice("Gender", labels(Gender::ALL, Gender::label), input.gender.label()),
            FormField::text(
                "Age",
                format!("years ({}-{})", AGE_RANGE.0, AGE_RANGE.1),
                input.age.to_string(),
            ),
            FormField::text(
                "BMI",
                format!("kg/m² ({}-{})", BMI_RANGE.0, BMI_RANGE.1),
                format!("{:.1}", input.bmi),
            ),
            FormField::text(
                "Cholesterol Level",
                format!("mg/dL ({}-{})", CHOLESTEROL_RANGE.0, CHOLESTEROL_RANGE.1),
                format!("{:.0}", input.cholesterol),
            ),
            FormField::choice(
                "Smoking Status",
                labels(SmokingStatus::ALL, SmokingStatus::label),
                input.smoking_status.label(),
            ),
            FormField::choice(
                "Asthma History",
                labels(Asthma::ALL, Asthma::label),
                input.asthma.label(),
            ),
            FormField::text(
                "Diagnosis Date",
                "YYYY-MM-DD".to_string(),
                input.diagnosis_date.format(DATE_FORMAT).to_string(),
            ),
            FormField::text(
                "Treatment End Date",
                "YYYY-MM-DD".to_string(),
                input.treatment_end_date.format(DATE_FORMAT).to_string(),
            ),
            FormField::choice(
                "Cancer Stage",
                labels(CancerStage::ALL, CancerStage::label),
                input.cancer_stage.label(),
            ),
            FormField::choice(
                "Treatment Type",
                labels(TreatmentType::ALL, TreatmentType::label),
                input.treatment_type.label(),
            ),
        ];

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle the current choice field forward (`true`) or backward.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldValue::Choice { options, selected } =
            &mut self.fields[self.selected_field].value
        {
            let n = options.len();
            *selected = if forward {
                (*selected + 1) % n
            } else {
                (*selected + n - 1) % n
            };
            self.error_message = None;
        }
    }

    /// Add a character to the current text field
    pub fn input_char(&mut self, c: char) {
        if let FieldValue::Text(value) = &mut self.fields[self.selected_field].value {
            if c.is_ascii_digit() || c == '.' || c == '-' {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        if let FieldValue::Text(value) = &mut self.fields[self.selected_field].value {
            value.pop();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        if let FieldValue::Text(value) = &mut self.fields[self.selected_field].value {
            value.zeroize();
        }
    }

    /// Wipe all text buffers from memory.
    pub fn clear_sensitive(&mut self) {
        for field in &mut self.fields {
            if let FieldValue::Text(value) = &mut field.value {
                value.zeroize();
            }
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Restore the default values.
    pub fn load_defaults(&mut self) {
        self.clear_sensitive();
        *self = Self::default();
    }

    fn text(&self, index: usize) -> &str {
        self.fields[index].display().trim()
    }

    fn choice<T: std::str::FromStr<Err = String>>(&self, index: usize) -> Result<T, String> {
        self.fields[index].display().parse()
    }

    fn number<T: std::str::FromStr>(&self, index: usize) -> Result<T, String> {
        let field = &self.fields[index];
        self.text(index)
            .parse()
            .map_err(|_| format!("{}: Invalid number", field.label))
    }

    fn date(&self, index: usize) -> Result<NaiveDate, String> {
        let field = &self.fields[index];
        NaiveDate::parse_from_str(self.text(index), DATE_FORMAT)
            .map_err(|_| format!("{}: Expected a date as YYYY-MM-DD", field.label))
    }

    /// Parse the form into a patient input. Range checks are left to
    /// `PatientInput::validate`.
    ///
    /// # Errors
    /// Returns the first field that does not parse.
    pub fn to_patient_input(&self) -> Result<PatientInput, String> {
        Ok(PatientInput {
            gender: self.choice(GENDER)?,
            age: self.number(AGE)?,
            bmi: self.number(BMI)?,
            cholesterol: self.number(CHOLESTEROL)?,
            smoking_status: self.choice(SMOKING)?,
            asthma: self.choice(ASTHMA)?,
            diagnosis_date: self.date(DIAGNOSIS_DATE)?,
            treatment_end_date: self.date(TREATMENT_END_DATE)?,
            cancer_stage: self.choice(CANCER_STAGE)?,
            treatment_type: self.choice(TREATMENT_TYPE)?,
        })
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {LOGO_SMALL} "), MedicalTheme::header()),
        Span::styled(" Patient Information", MedicalTheme::title()),
        Span::styled(" │ Cancer Survival Prediction", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let line = match &field.value {
            FieldValue::Choice { options, selected } => {
                let value_style = if is_selected {
                    MedicalTheme::selected()
                } else {
                    MedicalTheme::text()
                };
                Line::from(vec![
                    Span::styled(" ◂ ", MedicalTheme::text_muted()),
                    Span::styled(options[*selected], value_style),
                    Span::styled(" ▸ ", MedicalTheme::text_muted()),
                ])
            }
            FieldValue::Text(value) => Line::from(vec![
                Span::raw(" "),
                if value.is_empty() {
                    Span::styled(field.hint.as_str(), MedicalTheme::text_muted())
                } else {
                    Span::styled(value.as_str(), MedicalTheme::text())
                },
                if is_selected {
                    Span::styled("▌", MedicalTheme::cursor())
                } else {
                    Span::raw("")
                },
            ]),
        };

        f.render_widget(Paragraph::new(line).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Generate Prediction ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Defaults ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
