//! Patient data entry form, generated from the feature schema.
//!
//! The form carries no feature list of its own: every field, its order, and
//! its input rule come from the schema the model was trained against, the
//! same rule table the web form renders from.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{FeatureKind, FeatureSchema, RawInput};
use crate::tui::styles::ClinicalTheme;

/// One editable field, derived from a schema entry.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub hint: String,
    pub binary: bool,
    pub value: String,
}

/// Screening form state.
pub struct ScreeningForm {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl ScreeningForm {
    /// Build one field per schema entry, in schema order.
    #[must_use]
    pub fn from_schema(schema: &FeatureSchema) -> Self {
        let fields = schema
            .features()
            .iter()
            .map(|spec| {
                let hint = match &spec.kind {
                    FeatureKind::Binary { labels } => {
                        format!("0 ({}) / 1 ({})", labels[0], labels[1])
                    }
                    FeatureKind::Numeric => {
                        spec.hint.clone().unwrap_or_else(|| "numeric".to_string())
                    }
                };
                FormField {
                    name: spec.name.clone(),
                    hint,
                    binary: spec.is_binary(),
                    value: String::new(),
                }
            })
            .collect();

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

    /// Add a character to the current field, per the field's kind.
    ///
    /// Binary fields accept only the codes `0`/`1` and typing replaces the
    /// buffer; numeric fields accept digits, `.` and `-`.
    pub fn input_char(&mut self, c: char) {
        let field = &mut self.fields[self.selected_field];

        if field.binary {
            if c == '0' || c == '1' {
                field.value.clear();
                field.value.push(c);
                self.error_message = None;
            }
        } else if c.is_ascii_digit() || c == '.' || c == '-' {
            field.value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.clear();
    }

    /// Wipe all field buffers from memory and clear values.
    ///
    /// Called after a successful submission and on explicit clear so
    /// patient-entered plaintext does not persist in UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Snapshot the buffers as a raw submission for the collector.
    ///
    /// No validation happens here; the collector owns the coercion rules.
    #[must_use]
    pub fn to_raw_input(&self) -> RawInput {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }

    /// Focus the field for `feature`, if the form has it.
    pub fn focus_feature(&mut self, feature: &str) {
        if let Some(index) = self.fields.iter().position(|f| f.name == feature) {
            self.selected_field = index;
        }
    }

    /// Load a typical at-risk profile for demonstration.
    pub fn load_sample_data(&mut self) {
        // Values apply by name, so a schema change simply leaves
        // unmatched fields untouched.
        let sample: &[(&str, &str)] = &[
            ("Gender", "1"),
            ("SystolicBP", "142"),
            ("FastingBloodSugar", "118"),
            ("HbA1c", "6.1"),
            ("SerumCreatinine", "1.8"),
            ("BUNLevels", "28"),
            ("GFR", "54"),
            ("ProteinInUrine", "1.2"),
            ("MuscleCramps", "0"),
            ("Itching", "0"),
            ("FamilyHistoryHypertension", "0"),
        ];
        for field in self.fields.iter_mut() {
            if let Some((_, value)) = sample.iter().find(|(name, _)| *name == field.name) {
                field.value = (*value).to_string();
            }
        }
    }
}

/// Render the patient data entry form
pub fn render_form(f: &mut Frame, area: Rect, state: &ScreeningForm) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicalTheme::text()),
        Span::styled("Patient Data Entry", ClinicalTheme::title()),
        Span::styled(" │ CKD Screening Features", ClinicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &ScreeningForm) {
    // Create a two-column layout
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

    // Left column
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);

    // Right column
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
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            ClinicalTheme::border_focused()
        } else {
            ClinicalTheme::border()
        };

        let title_style = if is_selected {
            ClinicalTheme::focused()
        } else {
            ClinicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.name), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = if field.value.is_empty() {
            Span::styled(field.hint.as_str(), ClinicalTheme::text_muted())
        } else {
            Span::styled(field.value.as_str(), ClinicalTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", ClinicalTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &ScreeningForm) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicalTheme::danger()),
            Span::styled(err.clone(), ClinicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicalTheme::key_hint()),
            Span::styled("Navigate ", ClinicalTheme::key_desc()),
            Span::styled("[Enter] ", ClinicalTheme::key_hint()),
            Span::styled("Predict ", ClinicalTheme::key_desc()),
            Span::styled("[S] ", ClinicalTheme::key_hint()),
            Span::styled("Sample Data ", ClinicalTheme::key_desc()),
            Span::styled("[Ctrl+L] ", ClinicalTheme::key_hint()),
            Span::styled("Clear ", ClinicalTheme::key_desc()),
            Span::styled("[Q] ", ClinicalTheme::key_hint()),
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
    use crate::domain::{collect, FeatureSpec};

    fn sample_schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureSpec::binary("Gender", ["Female", "Male"]),
            FeatureSpec::numeric("GFR").with_hint("Normal: >90, CKD: <60"),
            FeatureSpec::binary("Itching", ["No", "Yes"]),
        ])
        .expect("valid schema")
    }

    #[test]
    fn test_fields_mirror_the_schema() {
        let form = ScreeningForm::from_schema(&sample_schema());

        assert_eq!(form.fields.len(), 3);
        assert_eq!(form.fields[0].name, "Gender");
        assert!(form.fields[0].binary);
        assert_eq!(form.fields[0].hint, "0 (Female) / 1 (Male)");
        assert_eq!(form.fields[1].name, "GFR");
        assert!(!form.fields[1].binary);
        assert_eq!(form.fields[1].hint, "Normal: >90, CKD: <60");
    }

    #[test]
    fn test_binary_fields_accept_only_codes() {
        let mut form = ScreeningForm::from_schema(&sample_schema());

        form.input_char('5');
        form.input_char('a');
        assert_eq!(form.fields[0].value, "");

        form.input_char('0');
        assert_eq!(form.fields[0].value, "0");

        // Typing another code replaces rather than appends.
        form.input_char('1');
        assert_eq!(form.fields[0].value, "1");
    }

    #[test]
    fn test_numeric_fields_accept_float_characters() {
        let mut form = ScreeningForm::from_schema(&sample_schema());
        form.next_field();

        for c in "-12.5x".chars() {
            form.input_char(c);
        }
        assert_eq!(form.fields[1].value, "-12.5");

        form.delete_char();
        assert_eq!(form.fields[1].value, "-12.");
    }

    #[test]
    fn test_navigation_wraps() {
        let mut form = ScreeningForm::from_schema(&sample_schema());

        form.prev_field();
        assert_eq!(form.selected_field, 2);
        form.next_field();
        assert_eq!(form.selected_field, 0);
    }

    #[test]
    fn test_raw_input_feeds_the_collector() {
        let schema = sample_schema();
        let mut form = ScreeningForm::from_schema(&schema);

        form.input_char('1');
        form.next_field();
        for c in "52.4".chars() {
            form.input_char(c);
        }
        form.next_field();
        form.input_char('0');

        let record = collect(&schema, &form.to_raw_input()).expect("collect");
        assert_eq!(record.get("Gender"), Some(1.0));
        assert_eq!(record.get("GFR"), Some(52.4));
        assert_eq!(record.get("Itching"), Some(0.0));
    }

    #[test]
    fn test_clear_sensitive_wipes_every_buffer() {
        let mut form = ScreeningForm::from_schema(&sample_schema());
        form.load_sample_data();
        form.next_field();
        form.error_message = Some("stale".to_string());

        form.clear_sensitive();

        assert!(form.fields.iter().all(|f| f.value.is_empty()));
        assert_eq!(form.selected_field, 0);
        assert!(form.error_message.is_none());
    }

    #[test]
    fn test_focus_feature_selects_the_named_field() {
        let mut form = ScreeningForm::from_schema(&sample_schema());

        form.focus_feature("Itching");
        assert_eq!(form.selected_field, 2);

        // Unknown names leave the focus alone.
        form.focus_feature("NotAFeature");
        assert_eq!(form.selected_field, 2);
    }

    #[test]
    fn test_sample_data_fills_matching_names_only() {
        let mut form = ScreeningForm::from_schema(&sample_schema());
        form.load_sample_data();

        assert_eq!(form.fields[0].value, "1");
        assert_eq!(form.fields[1].value, "54");
        assert_eq!(form.fields[2].value, "0");
    }
}
