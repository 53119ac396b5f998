//! Web adapter: the server-rendered screening form.
//!
//! One page, generated from the feature schema: `GET /` renders the empty
//! form, `POST /predict` re-renders it with an outcome banner or the input
//! error inline. Input errors answer 400 and inference failures 422, so an
//! operator mistake is distinguishable from a backend fault.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::application::{ScreeningError, ScreeningService};
use crate::domain::{FeatureKind, FeatureSchema, FeatureSpec, RawInput, Screening};
use crate::ports::Classifier;

/// Build the screening router over a shared service.
pub fn router<C>(service: Arc<ScreeningService<C>>) -> Router
where
    C: Classifier + 'static,
{
    Router::new()
        .route("/", get(index::<C>))
        .route("/predict", post(predict::<C>))
        .route("/health", get(health::<C>))
        .with_state(service)
}

async fn index<C>(State(service): State<Arc<ScreeningService<C>>>) -> Html<String>
where
    C: Classifier,
{
    Html(render_page(service.schema(), &RawInput::new(), None))
}

async fn predict<C>(
    State(service): State<Arc<ScreeningService<C>>>,
    Form(raw): Form<RawInput>,
) -> (StatusCode, Html<String>)
where
    C: Classifier,
{
    match service.screen(&raw) {
        Ok(screening) => {
            let page = render_page(service.schema(), &raw, Some(&Banner::Outcome(&screening)));
            (StatusCode::OK, Html(page))
        }
        Err(err) => {
            let status = match &err {
                ScreeningError::Input(_) => StatusCode::BAD_REQUEST,
                ScreeningError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            let page = render_page(service.schema(), &raw, Some(&Banner::Error(err.to_string())));
            (status, Html(page))
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    features: usize,
}

async fn health<C>(State(service): State<Arc<ScreeningService<C>>>) -> Json<HealthResponse>
where
    C: Classifier,
{
    Json(HealthResponse {
        status: "ok",
        features: service.schema().len(),
    })
}

/// What the page shows above the form, if anything.
enum Banner<'a> {
    Outcome(&'a Screening),
    Error(String),
}

const PAGE_STYLE: &str = "\
body { font-family: sans-serif; max-width: 720px; margin: 2rem auto; color: #263238; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 0.75rem 1.5rem; }
label { display: block; font-weight: bold; margin-bottom: 0.25rem; }
input, select { width: 100%; padding: 0.4rem; box-sizing: border-box; }
.hint { color: #78909c; font-size: 0.8rem; margin: 0.15rem 0 0 0; }
button { margin-top: 1.25rem; padding: 0.5rem 2rem; }
.banner { padding: 1rem; border-radius: 6px; margin-bottom: 1.25rem; }
.positive { background: #fce4ec; border: 1px solid #ef5350; color: #ef5350; }
.negative { background: #e8f5e9; border: 1px solid #66bb6a; color: #2e7d32; }
.error { background: #fff3e0; border: 1px solid #ffb74d; color: #e65100; }
.disclaimer { color: #78909c; font-size: 0.8rem; margin-top: 2rem; }
";

/// Render the full page: optional banner, then the schema-driven form.
///
/// `values` carries the previous submission so the form re-fills after an
/// error instead of discarding the operator's input.
fn render_page(schema: &FeatureSchema, values: &RawInput, banner: Option<&Banner>) -> String {
    let mut page = String::with_capacity(4096);

    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n<title>Chronic Kidney Disease Screening</title>\n");
    page.push_str("<style>\n");
    page.push_str(PAGE_STYLE);
    page.push_str("</style>\n</head>\n<body>\n");
    page.push_str("<h1>Chronic Kidney Disease Screening</h1>\n");

    if let Some(banner) = banner {
        page.push_str(&render_banner(banner));
    }

    page.push_str("<form method=\"post\" action=\"/predict\">\n<div class=\"grid\">\n");
    for spec in schema.features() {
        page.push_str(&render_field(spec, values.get(&spec.name).map(String::as_str)));
    }
    page.push_str("</div>\n<button type=\"submit\">Predict</button>\n</form>\n");

    page.push_str(
        "<p class=\"disclaimer\">For screening purposes only. Not a medical diagnosis.</p>\n",
    );
    page.push_str("</body>\n</html>\n");

    page
}

fn render_banner(banner: &Banner) -> String {
    match banner {
        Banner::Outcome(screening) => {
            let class = if screening.outcome.is_positive() {
                "positive"
            } else {
                "negative"
            };
            format!(
                "<div class=\"banner {class}\"><strong>{}</strong><br>{}<br>\
                 <small>Evaluated at {}</small></div>\n",
                escape_html(screening.outcome.label()),
                escape_html(screening.outcome.description()),
                screening.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            )
        }
        Banner::Error(message) => {
            format!("<div class=\"banner error\">{}</div>\n", escape_html(message))
        }
    }
}

/// Render one field: a labelled `<select>` for binary features, a numeric
/// `<input>` with its hint for everything else.
fn render_field(spec: &FeatureSpec, value: Option<&str>) -> String {
    let name = escape_html(&spec.name);
    let mut field = format!("<div class=\"field\">\n<label for=\"{name}\">{name}</label>\n");

    match &spec.kind {
        FeatureKind::Binary { labels } => {
            field.push_str(&format!("<select id=\"{name}\" name=\"{name}\">\n"));
            for (code, label) in labels.iter().enumerate() {
                let code_str = code.to_string();
                let selected = if value == Some(code_str.as_str()) {
                    " selected"
                } else {
                    ""
                };
                field.push_str(&format!(
                    "<option value=\"{code}\"{selected}>{code} ({})</option>\n",
                    escape_html(label)
                ));
            }
            field.push_str("</select>\n");
        }
        FeatureKind::Numeric => {
            let filled = value.map(escape_html).unwrap_or_default();
            field.push_str(&format!(
                "<input id=\"{name}\" name=\"{name}\" type=\"number\" step=\"0.01\" \
                 value=\"{filled}\">\n"
            ));
            if let Some(hint) = &spec.hint {
                field.push_str(&format!("<p class=\"hint\">{}</p>\n", escape_html(hint)));
            }
        }
    }

    field.push_str("</div>\n");
    field
}

/// Minimal HTML escaping for text and attribute positions.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outcome, OrderedRow};
    use crate::ports::InferenceError;

    struct StubClassifier;

    impl Classifier for StubClassifier {
        fn feature_count(&self) -> usize {
            3
        }

        fn predict(&self, rows: &[OrderedRow]) -> Result<Vec<i64>, InferenceError> {
            Ok(vec![1; rows.len()])
        }
    }

    fn sample_schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            FeatureSpec::binary("Gender", ["Female", "Male"]),
            FeatureSpec::numeric("GFR").with_hint("Normal: >90, CKD: <60"),
            FeatureSpec::binary("Itching", ["No", "Yes"]),
        ])
        .expect("valid schema")
    }

    fn values(pairs: &[(&str, &str)]) -> RawInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_form_renders_every_schema_feature() {
        let page = render_page(&sample_schema(), &RawInput::new(), None);

        assert!(page.contains("name=\"Gender\""));
        assert!(page.contains("name=\"GFR\""));
        assert!(page.contains("name=\"Itching\""));
        assert!(page.contains("<option value=\"0\">0 (Female)</option>"));
        assert!(page.contains("<option value=\"1\">1 (Male)</option>"));
        assert!(page.contains("Normal: &gt;90, CKD: &lt;60"));
        assert!(page.contains("action=\"/predict\""));
    }

    #[test]
    fn test_submitted_values_are_refilled() {
        let page = render_page(
            &sample_schema(),
            &values(&[("Gender", "1"), ("GFR", "52")]),
            None,
        );

        assert!(page.contains("<option value=\"1\" selected>1 (Male)</option>"));
        assert!(page.contains("value=\"52\""));
    }

    #[test]
    fn test_error_banner_preserves_original_phrasing() {
        let banner = Banner::Error("Missing input for: 'GFR'".to_string());
        let page = render_page(&sample_schema(), &RawInput::new(), Some(&banner));

        assert!(page.contains("class=\"banner error\""));
        assert!(page.contains("Missing input for: &#39;GFR&#39;"));
    }

    #[test]
    fn test_outcome_banner_styles_by_class() {
        let positive = Screening::new(Outcome::CkdDetected);
        let page = render_page(
            &sample_schema(),
            &RawInput::new(),
            Some(&Banner::Outcome(&positive)),
        );
        assert!(page.contains("class=\"banner positive\""));
        assert!(page.contains("CKD Detected"));

        let negative = Screening::new(Outcome::NoCkd);
        let page = render_page(
            &sample_schema(),
            &RawInput::new(),
            Some(&Banner::Outcome(&negative)),
        );
        assert!(page.contains("class=\"banner negative\""));
        assert!(page.contains("No CKD"));
    }

    #[test]
    fn test_escape_html_covers_markup_characters() {
        assert_eq!(escape_html("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_router_wires_the_service() {
        let service = Arc::new(ScreeningService::new(
            Arc::new(sample_schema()),
            Arc::new(StubClassifier),
        ));
        let _router = router(service);
    }
}
