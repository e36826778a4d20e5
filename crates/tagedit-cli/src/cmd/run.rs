//! `tagedit run`: drive one edit dialog through a scripted scenario and
//! print the transcript.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode};
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tagedit_core::config::{EditorConfig, load_config};
use tagedit_core::error::ErrorCode;
use tagedit_core::scenario::{self, Outcome, StepReport, Transcript};
use tagedit_core::validate::NAME_FIELD;
use tagedit_core::{ControllerSnapshot, Effect, Phase};
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (`.yaml`, `.yml` or `.json`).
    pub path: PathBuf,
}

pub fn run_run(args: &RunArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let config = load_editor_config(output, project_root)?;

    let scenario = match scenario::load_scenario(&args.path) {
        Ok(s) => s,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            anyhow::bail!("{e}");
        }
    };

    let transcript = match scenario::run(&scenario, &config) {
        Ok(t) => t,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            anyhow::bail!("{e}");
        }
    };
    info!(
        path = %args.path.display(),
        steps = transcript.steps.len(),
        open_at_end = transcript.open_at_end,
        "scenario finished"
    );

    render_mode(output, &transcript, render_text, render_pretty)
}

/// Load `.tagedit/config.toml`, reporting parse failures in the output mode.
fn load_editor_config(output: OutputMode, project_root: &Path) -> anyhow::Result<EditorConfig> {
    match load_config(project_root) {
        Ok(config) => Ok(config),
        Err(e) => {
            let code = ErrorCode::ConfigParseError;
            render_error(
                output,
                &CliError {
                    message: format!("{e:#}"),
                    suggestion: code.hint().map(str::to_string),
                    error_code: Some(code.code().to_string()),
                },
            )?;
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Loading => "loading",
        Phase::Ready => "ready",
        Phase::Submitting => "submitting",
        Phase::ReadyWithServerError => "ready_with_server_error",
    }
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::Update(intent) => format!(
            "update {} name={:?} close={}",
            intent.tag.id,
            intent.form_data.name.current(),
            intent.close_dialog_id
        ),
        Effect::OpenConfirm(intent) => format!(
            "open_confirm {} close={}",
            intent.document_id, intent.close_dialog_id
        ),
        Effect::RemoveDialog(id) => format!("remove_dialog {id}"),
    }
}

fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Succeeded => "succeeded".to_string(),
        Outcome::Failed { message } => format!("failed: {message}"),
    }
}

fn name_error(state: &ControllerSnapshot) -> Option<&str> {
    state
        .form
        .field_errors
        .get(NAME_FIELD)
        .map(|e| e.message.as_str())
}

fn flags(state: &ControllerSnapshot) -> String {
    let mut parts = Vec::new();
    if state.form.is_dirty {
        parts.push("dirty");
    }
    if state.form.is_valid {
        parts.push("valid");
    }
    if state.fields_disabled {
        parts.push("disabled");
    }
    if state.can_submit {
        parts.push("can_submit");
    }
    if state.can_delete {
        parts.push("can_delete");
    }
    parts.join(",")
}

fn text_row(w: &mut dyn Write, index: &str, step: &str, state: &ControllerSnapshot, extra: &str) -> io::Result<()> {
    writeln!(
        w,
        "{index}  {step}  {}  {:?}  {}  {}  {extra}",
        phase_label(state.phase),
        state.form.values.name,
        name_error(state).unwrap_or("-"),
        flags(state),
    )
}

fn render_text(t: &Transcript, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "index  step  phase  name  error  flags  effect")?;
    text_row(w, "-", "initial", &t.initial, "-")?;
    for report in &t.steps {
        let extra = report
            .effect
            .as_ref()
            .map(describe_effect)
            .or_else(|| report.outcome.as_ref().map(describe_outcome))
            .unwrap_or_else(|| "-".to_string());
        text_row(w, &report.index.to_string(), report.step, &report.state, &extra)?;
    }
    writeln!(w, "open_at_end  {}", t.open_at_end)
}

fn pretty_state(w: &mut dyn Write, state: &ControllerSnapshot) -> io::Result<()> {
    pretty_kv(w, "Phase", phase_label(state.phase))?;
    pretty_kv(w, "Name", format!("{:?}", state.form.values.name))?;
    if let Some(error) = name_error(state) {
        pretty_kv(w, "Error", error)?;
    }
    pretty_kv(w, "Flags", flags(state))?;
    if let Some(ts) = state.last_updated {
        pretty_kv(w, "Updated", ts.to_rfc3339())?;
    }
    Ok(())
}

fn pretty_step(w: &mut dyn Write, report: &StepReport) -> io::Result<()> {
    writeln!(w)?;
    pretty_section(w, &format!("Step {}: {}", report.index, report.step))?;
    if let Some(effect) = &report.effect {
        pretty_kv(w, "Effect", describe_effect(effect))?;
    }
    if let Some(outcome) = &report.outcome {
        pretty_kv(w, "Outcome", describe_outcome(outcome))?;
    }
    pretty_state(w, &report.state)?;
    let dialogs: Vec<&str> = report.dialogs.iter().map(|d| d.id().as_str()).collect();
    pretty_kv(
        w,
        "Dialogs",
        if dialogs.is_empty() {
            "(none)".to_string()
        } else {
            dialogs.join(", ")
        },
    )
}

fn render_pretty(t: &Transcript, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Edit dialog {}", t.dialog))?;
    pretty_state(w, &t.initial)?;
    for report in &t.steps {
        pretty_step(w, report)?;
    }
    writeln!(w)?;
    pretty_rule(w)?;
    writeln!(
        w,
        "Dialog {} is {} after {} step(s).",
        t.dialog,
        if t.open_at_end { "open" } else { "closed" },
        t.steps.len()
    )
}
