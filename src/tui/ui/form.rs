//! Vitals input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{Field, ValidationError, VitalsInput};
use crate::tui::styles::ClinicalTheme;

const SEX_OPTIONS: &[&str] = &["female", "male"];
const LEVEL_OPTIONS: &[&str] = &["normal", "above-normal", "high"];

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free numeric text
    Numeric { hint: &'static str },
    /// Cycles through fixed options
    Choice { options: &'static [&'static str] },
    /// Yes/no
    Toggle,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub error: Option<String>,
    /// Domain field this input feeds, if it can fail validation
    pub target: Option<Field>,
}

impl FormField {
    fn numeric(field: Field, hint: &'static str) -> Self {
        Self::new(field.label(), FieldKind::Numeric { hint }, Some(field))
    }

    fn choice(field: Field, options: &'static [&'static str]) -> Self {
        Self::new(field.label(), FieldKind::Choice { options }, Some(field))
    }

    fn toggle(label: &'static str) -> Self {
        Self::new(label, FieldKind::Toggle, None)
    }

    fn new(label: &'static str, kind: FieldKind, target: Option<Field>) -> Self {
        Self {
            label,
            kind,
            value: String::new(),
            checked: false,
            error: None,
            target,
        }
    }

    fn display(&self) -> (String, bool) {
        match self.kind {
            FieldKind::Toggle => (if self.checked { "Yes" } else { "No" }.to_string(), true),
            FieldKind::Numeric { hint } if self.value.is_empty() => (hint.to_string(), false),
            FieldKind::Choice { .. } if self.value.is_empty() => ("< select >".to_string(), false),
            _ => (self.value.clone(), true),
        }
    }
}

/// Vitals form state
pub struct VitalsFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub notice: Option<String>,
}

impl Default for VitalsFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::numeric(Field::Age, "years (18-100)"),
                FormField::choice(Field::Sex, SEX_OPTIONS),
                FormField::numeric(Field::Height, "cm (100-250)"),
                FormField::numeric(Field::Weight, "kg (30-200)"),
                FormField::numeric(Field::Systolic, "mmHg (60-250)"),
                FormField::numeric(Field::Diastolic, "mmHg (40-150)"),
                FormField::choice(Field::Cholesterol, LEVEL_OPTIONS),
                FormField::choice(Field::Glucose, LEVEL_OPTIONS),
                FormField::toggle("Smoker"),
                FormField::toggle("Alcohol"),
                FormField::toggle("Physically active"),
            ],
            selected_field: 0,
            notice: None,
        }
    }
}

impl VitalsFormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    fn current(&mut self) -> &mut FormField {
        &mut self.fields[self.selected_field]
    }

    /// Type a character into the current field.
    pub fn input_char(&mut self, c: char) {
        match self.fields[self.selected_field].kind {
            FieldKind::Numeric { .. } if c.is_ascii_digit() || c == '.' => {
                let field = self.current();
                field.value.push(c);
                field.error = None;
            }
            FieldKind::Choice { .. } | FieldKind::Toggle if c == ' ' => self.cycle(true),
            _ => {}
        }
    }

    /// Step through options or flip a toggle.
    pub fn cycle(&mut self, forward: bool) {
        let field = self.current();
        match field.kind {
            FieldKind::Choice { options } => {
                let len = options.len();
                let next = match options.iter().position(|o| *o == field.value) {
                    Some(i) if forward => (i + 1) % len,
                    Some(i) => (i + len - 1) % len,
                    None if forward => 0,
                    None => len - 1,
                };
                field.value = options[next].to_string();
                field.error = None;
            }
            FieldKind::Toggle => field.checked = !field.checked,
            FieldKind::Numeric { .. } => {}
        }
    }

    pub fn delete_char(&mut self) {
        let field = self.current();
        if matches!(field.kind, FieldKind::Numeric { .. }) {
            field.value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        let field = self.current();
        field.value.zeroize();
        field.checked = false;
    }

    /// Attach each error to its field; all of them show at once.
    pub fn set_errors(&mut self, errors: &[ValidationError]) {
        for field in &mut self.fields {
            field.error = field.target.and_then(|target| {
                errors
                    .iter()
                    .find(|e| e.field == target)
                    .map(|e| e.reason.to_string())
            });
        }
        self.notice = Some(format!(
            "{} field(s) need attention",
            self.fields.iter().filter(|f| f.error.is_some()).count()
        ));

        if let Some(first) = self.fields.iter().position(|f| f.error.is_some()) {
            self.selected_field = first;
        }
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.fields.iter().filter(|f| f.error.is_some()).count()
    }

    fn value_of(&self, target: Field) -> String {
        self.fields
            .iter()
            .find(|f| f.target == Some(target))
            .map(|f| f.value.clone())
            .unwrap_or_default()
    }

    fn checked(&self, label: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.label == label && f.checked)
    }

    /// Raw form contents for validation.
    #[must_use]
    pub fn to_input(&self) -> VitalsInput {
        VitalsInput {
            age: self.value_of(Field::Age),
            sex: self.value_of(Field::Sex),
            height: self.value_of(Field::Height),
            weight: self.value_of(Field::Weight),
            systolic: self.value_of(Field::Systolic),
            diastolic: self.value_of(Field::Diastolic),
            cholesterol: self.value_of(Field::Cholesterol),
            glucose: self.value_of(Field::Glucose),
            smoker: self.checked("Smoker"),
            alcohol: self.checked("Alcohol"),
            active: self.checked("Physically active"),
        }
    }

    /// Wipe all field buffers once the request has been handed off.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
            field.checked = false;
            field.error = None;
        }
        self.notice = None;
        self.selected_field = 0;
    }

    /// Typical profile with mildly elevated blood pressure.
    pub fn load_sample_data(&mut self) {
        let sample = [
            "52",     // age
            "male",   // sex
            "176",    // height (cm)
            "84",     // weight (kg)
            "138",    // systolic
            "88",     // diastolic
            "above-normal",
            "normal",
        ];
        for (field, value) in self.fields.iter_mut().zip(sample) {
            field.value = value.to_string();
            field.error = None;
        }
        for field in self.fields.iter_mut().filter(|f| f.kind == FieldKind::Toggle) {
            field.checked = field.label == "Physically active";
        }
        self.notice = None;
    }
}

/// Zeroize the text buffers of an input that is no longer needed.
pub fn wipe_input(input: &mut VitalsInput) {
    input.age.zeroize();
    input.sex.zeroize();
    input.height.zeroize();
    input.weight.zeroize();
    input.systolic.zeroize();
    input.diastolic.zeroize();
    input.cholesterol.zeroize();
    input.glucose.zeroize();
}

/// Render the vitals form
pub fn render_vitals_form(f: &mut Frame, area: Rect, state: &VitalsFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Risk Assessment", ClinicalTheme::title()),
        Span::styled(" │ Enter clinical vitals", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &VitalsFormState) {
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
        let border_style = match (&field.error, is_selected) {
            (Some(_), _) => ClinicalTheme::danger(),
            (None, true) => ClinicalTheme::border_focused(),
            (None, false) => ClinicalTheme::border(),
        };
        let title_style = if is_selected {
            ClinicalTheme::focused()
        } else {
            ClinicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, filled) = field.display();
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(
                text,
                if filled {
                    ClinicalTheme::text()
                } else {
                    ClinicalTheme::text_muted()
                },
            ),
        ];
        if is_selected {
            spans.push(Span::styled("▌", ClinicalTheme::cursor()));
        }
        if let Some(err) = &field.error {
            spans.push(Span::styled(format!("  ! {err}"), ClinicalTheme::danger()));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &VitalsFormState) {
    let content = if let Some(notice) = &state.notice {
        Line::from(vec![
            Span::styled("! ", ClinicalTheme::danger()),
            Span::styled(notice.clone(), ClinicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicalTheme::key_hint()),
            Span::styled("Navigate ", ClinicalTheme::key_desc()),
            Span::styled("[←→/Space] ", ClinicalTheme::key_hint()),
            Span::styled("Choose ", ClinicalTheme::key_desc()),
            Span::styled("[Enter] ", ClinicalTheme::key_hint()),
            Span::styled("Assess ", ClinicalTheme::key_desc()),
            Span::styled("[S] ", ClinicalTheme::key_hint()),
            Span::styled("Sample Data ", ClinicalTheme::key_desc()),
            Span::styled("[Esc] ", ClinicalTheme::key_hint()),
            Span::styled("Clear ", ClinicalTheme::key_desc()),
            Span::styled("[Ctrl+Q] ", ClinicalTheme::key_hint()),
            Span::styled("Quit", ClinicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{normalize, Level, Sex, ValidationReason};

    fn select(state: &mut VitalsFormState, label: &str) {
        state.selected_field = state
            .fields
            .iter()
            .position(|f| f.label == label)
            .expect("Known label");
    }

    #[test]
    fn test_has_eleven_fields() {
        assert_eq!(VitalsFormState::default().fields.len(), 11);
    }

    #[test]
    fn test_numeric_input_filters_characters() {
        let mut state = VitalsFormState::default();
        for c in "4a5-".chars() {
            state.input_char(c);
        }
        assert_eq!(state.fields[0].value, "45");
        state.delete_char();
        assert_eq!(state.fields[0].value, "4");
    }

    #[test]
    fn test_choice_cycles_both_ways() {
        let mut state = VitalsFormState::default();
        select(&mut state, "Cholesterol");
        state.cycle(true);
        assert_eq!(state.fields[state.selected_field].value, "normal");
        state.cycle(false);
        assert_eq!(state.fields[state.selected_field].value, "high");
        state.input_char(' ');
        assert_eq!(state.fields[state.selected_field].value, "normal");
    }

    #[test]
    fn test_sample_data_normalizes() {
        let mut state = VitalsFormState::default();
        state.load_sample_data();

        let request = normalize(&state.to_input()).expect("Sample should be valid");
        assert_eq!(request.sex(), Sex::Male);
        assert_eq!(request.cholesterol(), Level::AboveNormal);
        assert!(request.active());
        assert!(!request.smoker());
    }

    #[test]
    fn test_errors_attach_to_fields() {
        let mut state = VitalsFormState::default();
        state.load_sample_data();
        select(&mut state, "Age");
        state.clear_field();
        select(&mut state, "Systolic BP");
        state.clear_field();
        for c in "70".chars() {
            state.input_char(c);
        }

        let errors = normalize(&state.to_input()).expect_err("Should fail");
        state.set_errors(&errors);

        assert_eq!(state.error_count(), 2);
        assert_eq!(
            state.fields[0].error.as_deref(),
            Some(ValidationReason::Missing.to_string().as_str())
        );
        assert!(state.fields[4].error.is_some());
        assert_eq!(state.selected_field, 0);
        assert!(state.notice.is_some());
    }

    #[test]
    fn test_clear_sensitive_wipes_everything() {
        let mut state = VitalsFormState::default();
        state.load_sample_data();
        state.clear_sensitive();

        assert!(state.fields.iter().all(|f| f.value.is_empty() && !f.checked));
        assert_eq!(state.to_input(), VitalsInput::default());
    }

    #[test]
    fn test_wipe_input() {
        let mut state = VitalsFormState::default();
        state.load_sample_data();
        let mut input = state.to_input();
        wipe_input(&mut input);
        assert!(input.age.is_empty() && input.sex.is_empty() && input.cholesterol.is_empty());
    }
}
