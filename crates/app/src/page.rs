//! HTML rendering of the single prediction page

use risk_lib::{InputCollector, InputError, ModelStatus, PipelineOutcome, StatusReport};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "LARS Risk Prediction Tool";
pub const MODEL_UNAVAILABLE_WARNING: &str =
    "Model not loaded: prediction is unavailable. Check that the model file exists.";
pub const PREDICTION_FAILED_PREFIX: &str = "Prediction failed";
pub const PREDICT_BUTTON: &str = "Predict";

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:320px;padding:1rem;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem}\
label{display:block;margin-top:.6rem;font-size:.9rem}\
input{width:100%}\
.success{background:#e6f4ea;padding:.8rem}.info{background:#e8f0fe;padding:.8rem}\
.warning{background:#fff4e5;padding:.8rem}.error{background:#fdecea;padding:.8rem}\
.field-error{color:#b00020;font-size:.8rem}";

/// Everything one page render needs
pub struct PageView<'a> {
    pub status: &'a StatusReport,
    pub inputs: &'a InputCollector,
    pub input_errors: &'a [InputError],
    pub outcome: Option<&'a PipelineOutcome>,
}

/// Escape text for inclusion in HTML content or attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(view: &PageView<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body>",
        title = PAGE_TITLE
    );

    render_sidebar(&mut html, view);

    html.push_str("<main>");
    let _ = write!(html, "<h1>{}</h1>", PAGE_TITLE);
    render_environment(&mut html, view.status);
    render_model_status(&mut html, &view.status.model);
    if let Some(outcome) = view.outcome {
        render_outcome(&mut html, outcome);
    }
    html.push_str("</main></body></html>");
    html
}

fn render_sidebar(html: &mut String, view: &PageView<'_>) {
    html.push_str("<aside><h2>Enter the following features</h2>");
    html.push_str("<form method=\"post\" action=\"/predict\">");

    for control in view.inputs.controls() {
        let spec = &control.spec;
        let _ = write!(
            html,
            "<label for=\"{name}\">{label} ({unit})</label>\
             <input type=\"number\" id=\"{name}\" name=\"{name}\" \
             min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\">",
            name = escape(spec.name),
            label = escape(spec.label),
            unit = escape(spec.unit),
            min = spec.min,
            max = spec.max,
            step = spec.step,
            value = control.value,
        );
        for error in view.input_errors.iter().filter(|e| e.field() == spec.name) {
            let _ = write!(html, "<div class=\"field-error\">{}</div>", escape(&error.to_string()));
        }
    }

    if view.status.model.is_loaded() {
        let _ = write!(html, "<p><button type=\"submit\">{}</button></p>", PREDICT_BUTTON);
    }
    html.push_str("</form><hr><h3>How to use</h3><div class=\"info\"><ol>\
                   <li>Enter the feature values</li>\
                   <li>Click the predict button</li>\
                   <li>Read the result</li></ol></div></aside>");
}

fn render_environment(html: &mut String, status: &StatusReport) {
    let env = &status.environment;
    let started = chrono::DateTime::from_timestamp(env.started_at, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default();

    let _ = write!(
        html,
        "<h2>Environment</h2><p>Version: {} &middot; Platform: {}/{} &middot; Started: {}</p>\
         <p>Status: {} ({}%)</p>",
        escape(&env.app_version),
        escape(&env.os),
        escape(&env.arch),
        started,
        escape(&status.description),
        status.progress,
    );
}

fn render_model_status(html: &mut String, model: &ModelStatus) {
    html.push_str("<h2>Model status</h2>");
    match model {
        ModelStatus::Loaded { version } => {
            let _ = write!(
                html,
                "<div class=\"success\">Model loaded successfully (version {})</div>",
                escape(version)
            );
        }
        ModelStatus::Pending => {
            html.push_str("<div class=\"info\">Model loading, please wait...</div>");
        }
        ModelStatus::Failed {
            message,
            directory_files,
        } => {
            let _ = write!(
                html,
                "<div class=\"error\">Model failed to load: {}</div>\
                 <div class=\"warning\">{}</div>",
                escape(message),
                MODEL_UNAVAILABLE_WARNING
            );
            html.push_str("<p>Files in model directory:</p><ul>");
            for file in directory_files {
                let _ = write!(html, "<li>{}</li>", escape(file));
            }
            html.push_str("</ul>");
        }
    }
}

fn render_outcome(html: &mut String, outcome: &PipelineOutcome) {
    html.push_str("<h2>Result</h2>");
    match outcome {
        PipelineOutcome::Succeeded(assessment) => {
            let class = if assessment.risk_present { "success" } else { "info" };
            let _ = write!(
                html,
                "<div class=\"{}\">{}</div><p><strong>Advice:</strong> {}</p>",
                class,
                escape(assessment.headline),
                escape(assessment.advice)
            );
        }
        PipelineOutcome::Failed(error) => {
            let _ = write!(
                html,
                "<div class=\"error\">{}: {}</div>",
                PREDICTION_FAILED_PREFIX,
                escape(&error.to_string())
            );
        }
        PipelineOutcome::Disabled => {
            let _ = write!(html, "<div class=\"warning\">{}</div>", MODEL_UNAVAILABLE_WARNING);
        }
    }
}
