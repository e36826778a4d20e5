//! Scripted runs of one edit dialog against the in-memory collaborators.
//!
//! A scenario seeds tags, opens one edit dialog, and applies a list of steps:
//! user events on the dialog, plus the store and confirmation-dialog outcomes
//! that would normally arrive asynchronously. Every step produces a
//! [`StepReport`] so runs can be diffed and asserted on.
//!
//! ```yaml
//! tags:
//!   - _id: t1
//!     name: { _type: slug, current: draft }
//!     _updatedAt: 2026-03-01T10:00:00Z
//! dialog: { id: t1, tagId: t1 }
//! steps:
//!   - step: input
//!     value: "Draft "
//!   - step: submit
//!   - step: resolve_update
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::controller::ControllerSnapshot;
use crate::desk::{Desk, DeskError};
use crate::dialog::OpenDialog;
use crate::error::ErrorCode;
use crate::model::{DialogDescriptor, DialogId, EntityId, ServerError, TagRecord};
use crate::session::{DialogEvent, EditSession, Effect};
use crate::store::Resolution;
use crate::validate::Schema;

// ---------------------------------------------------------------------------
// Scenario file
// ---------------------------------------------------------------------------

/// A scripted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    pub dialog: DialogDescriptor,
    pub steps: Vec<Step>,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// The user typed a new name.
    Input { value: String },
    /// The user pressed submit (or Enter).
    Submit,
    /// The user pressed delete.
    Delete,
    /// The user closed the dialog.
    Close,
    /// The store finished the pending update.
    ResolveUpdate {
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    /// The store set an error on the record outside any request.
    SetError { message: String },
    /// The store cleared the record's error.
    ClearError,
    /// The user confirmed the topmost delete confirmation.
    ConfirmDelete,
    /// The store finished the pending delete.
    ResolveDelete {
        #[serde(default)]
        error: Option<String>,
    },
    /// The user dismissed the topmost delete confirmation.
    CancelDelete,
}

impl Step {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Submit => "submit",
            Self::Delete => "delete",
            Self::Close => "close",
            Self::ResolveUpdate { .. } => "resolve_update",
            Self::SetError { .. } => "set_error",
            Self::ClearError => "clear_error",
            Self::ConfirmDelete => "confirm_delete",
            Self::ResolveDelete { .. } => "resolve_delete",
            Self::CancelDelete => "cancel_delete",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("failed to parse scenario: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// Two seeded tags share an id.
    #[error("duplicate tag id in scenario: {0}")]
    DuplicateTag(EntityId),

    /// A step needed an open confirmation dialog and there was none.
    #[error("step {index} ({step}): no delete confirmation is open")]
    NoConfirmation { index: usize, step: &'static str },

    /// The store or dialog stack rejected a step.
    #[error("step {index} ({step}): {source}")]
    Step {
        index: usize,
        step: &'static str,
        #[source]
        source: DeskError,
    },
}

impl ScenarioError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::ParseYaml(_) | Self::ParseJson(_) => {
                ErrorCode::ScenarioParseError
            }
            Self::DuplicateTag(_) | Self::NoConfirmation { .. } => ErrorCode::ScenarioInvalid,
            Self::Step { source, .. } => source.code(),
        }
    }
}

/// Read a scenario from a `.json`, `.yaml` or `.yml` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_scenario(&content, is_json)
}

/// Parse scenario text.
///
/// # Errors
///
/// Returns an error if the text is not a valid scenario.
pub fn parse_scenario(content: &str, is_json: bool) -> Result<Scenario, ScenarioError> {
    let scenario: Scenario = if is_json {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };
    scenario.check()?;
    Ok(scenario)
}

impl Scenario {
    /// Static consistency checks that do not need a run.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::DuplicateTag`] if two seeded tags share an id.
    pub fn check(&self) -> Result<(), ScenarioError> {
        let mut seen = std::collections::HashSet::new();
        for tag in &self.tags {
            if !seen.insert(&tag.id) {
                return Err(ScenarioError::DuplicateTag(tag.id.clone()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

/// What happened during one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub index: usize,
    pub step: &'static str,
    /// Effect produced by the edit dialog, if the step was a user event.
    pub effect: Option<Effect>,
    /// Outcome reported by the store for resolve steps.
    pub outcome: Option<Outcome>,
    pub state: ControllerSnapshot,
    pub dialogs: Vec<OpenDialog>,
}

/// Store outcome of a resolve step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Succeeded,
    Failed { message: String },
}

impl From<&Resolution> for Outcome {
    fn from(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Succeeded { .. } => Self::Succeeded,
            Resolution::Failed(err) => Self::Failed {
                message: err.message.clone(),
            },
        }
    }
}

/// Full record of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub dialog: DialogId,
    pub initial: ControllerSnapshot,
    pub steps: Vec<StepReport>,
    /// Whether the edit dialog is still open after the last step.
    pub open_at_end: bool,
}

/// Run `scenario` with the sanitizer and messages from `config`.
///
/// # Errors
///
/// Returns an error if a step cannot be applied (e.g. resolving an update
/// that was never dispatched).
pub fn run(scenario: &Scenario, config: &EditorConfig) -> Result<Transcript, ScenarioError> {
    scenario.check()?;

    let mut desk = Desk::new(scenario.tags.iter().cloned());
    desk.dialogs.open_tag_edit(scenario.dialog.clone());
    let mut session = EditSession::open(
        scenario.dialog.clone(),
        &mut desk.store,
        Schema::tag(config.form.required_message.clone()),
        config.sanitizer(),
    );
    let tag_id = scenario.dialog.tag_id.clone();
    let initial = session.snapshot();
    info!(dialog = %scenario.dialog.id, steps = scenario.steps.len(), "scenario started");

    let mut reports = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let label = step.label();
        let wrap = |source: DeskError| ScenarioError::Step {
            index,
            step: label,
            source,
        };
        let mut effect = None;
        let mut outcome = None;

        match step {
            Step::Input { value } => {
                effect = session.handle(
                    DialogEvent::Input(value.clone()),
                    &mut desk.store,
                    &mut desk.dialogs,
                );
            }
            Step::Submit => {
                effect = session.handle(DialogEvent::Submit, &mut desk.store, &mut desk.dialogs);
            }
            Step::Delete => {
                effect = session.handle(DialogEvent::Delete, &mut desk.store, &mut desk.dialogs);
            }
            Step::Close => {
                effect = session.handle(DialogEvent::Close, &mut desk.store, &mut desk.dialogs);
            }
            Step::ResolveUpdate { error, at } => {
                let result = error
                    .as_ref()
                    .map_or_else(|| Ok(at.unwrap_or_else(Utc::now)), |m| Err(ServerError::new(m)));
                let resolution = desk.resolve_update(&tag_id, result).map_err(wrap)?;
                outcome = Some(Outcome::from(&resolution));
            }
            Step::SetError { message } => {
                desk.store
                    .set_error(&tag_id, Some(ServerError::new(message)))
                    .map_err(|e| wrap(e.into()))?;
            }
            Step::ClearError => {
                desk.store
                    .set_error(&tag_id, None)
                    .map_err(|e| wrap(e.into()))?;
            }
            Step::ConfirmDelete => {
                let confirm = desk
                    .top_confirmation()
                    .ok_or(ScenarioError::NoConfirmation { index, step: label })?;
                desk.confirm_delete(&confirm).map_err(wrap)?;
            }
            Step::ResolveDelete { error } => {
                let confirm = desk
                    .top_confirmation()
                    .ok_or(ScenarioError::NoConfirmation { index, step: label })?;
                let result = error.as_ref().map_or(Ok(()), |m| Err(ServerError::new(m)));
                let resolution = desk.resolve_delete(&confirm, result).map_err(wrap)?;
                outcome = Some(Outcome::from(&resolution));
            }
            Step::CancelDelete => {
                let confirm = desk
                    .top_confirmation()
                    .ok_or(ScenarioError::NoConfirmation { index, step: label })?;
                desk.cancel_delete(&confirm).map_err(wrap)?;
            }
        }

        session.pump();
        let state = session.snapshot();
        debug!(index, step = label, phase = ?state.phase, "step applied");
        reports.push(StepReport {
            index,
            step: label,
            effect,
            outcome,
            state,
            dialogs: desk.dialogs.dialogs().to_vec(),
        });
    }

    let open_at_end = session.is_open(&desk.dialogs);
    Ok(Transcript {
        dialog: scenario.dialog.id.clone(),
        initial,
        steps: reports,
        open_at_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Phase;

    const RENAME: &str = r#"
tags:
  - _id: t1
    name: { _type: slug, current: draft }
    _updatedAt: 2026-03-01T10:00:00Z
dialog: { id: t1, tagId: t1 }
steps:
  - step: input
    value: "Draft "
  - step: submit
  - step: resolve_update
    at: 2026-03-01T11:00:00Z
"#;

    #[test]
    fn parses_yaml_steps() {
        let scenario = parse_scenario(RENAME, false).expect("parse");
        assert_eq!(scenario.tags.len(), 1);
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(
            scenario.steps[0],
            Step::Input {
                value: "Draft ".into()
            }
        );
    }

    #[test]
    fn rename_run_closes_dialog_on_success() {
        let scenario = parse_scenario(RENAME, false).expect("parse");
        let transcript = run(&scenario, &EditorConfig::default()).expect("run");

        let submit = &transcript.steps[1];
        let Some(Effect::Update(intent)) = &submit.effect else {
            panic!("expected update effect, got {:?}", submit.effect);
        };
        assert_eq!(intent.form_data.name.current(), "Draft");
        assert_eq!(submit.state.phase, Phase::Submitting);

        let resolve = &transcript.steps[2];
        assert_eq!(resolve.outcome, Some(Outcome::Succeeded));
        assert!(resolve.dialogs.is_empty());
        assert!(!transcript.open_at_end);
    }

    #[test]
    fn resolving_nothing_is_a_step_error() {
        let scenario = parse_scenario(
            r"
dialog: { id: t1, tagId: t1 }
tags:
  - _id: t1
    name: { _type: slug, current: draft }
    _updatedAt: 2026-03-01T10:00:00Z
steps:
  - step: resolve_update
",
            false,
        )
        .expect("parse");
        let err = run(&scenario, &EditorConfig::default()).expect_err("must fail");
        assert!(matches!(err, ScenarioError::Step { index: 0, .. }));
        assert_eq!(err.code(), ErrorCode::InternalUnexpected);
    }

    #[test]
    fn confirm_without_dialog_is_reported() {
        let scenario = parse_scenario(
            r#"{"dialog": {"id": "t1", "tagId": "t1"}, "steps": [{"step": "confirm_delete"}]}"#,
            true,
        )
        .expect("parse");
        let err = run(&scenario, &EditorConfig::default()).expect_err("must fail");
        assert!(matches!(err, ScenarioError::NoConfirmation { index: 0, .. }));
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let err = parse_scenario(
            r"
dialog: { id: t1, tagId: t1 }
tags:
  - _id: t1
    name: { _type: slug, current: a }
    _updatedAt: 2026-03-01T10:00:00Z
  - _id: t1
    name: { _type: slug, current: b }
    _updatedAt: 2026-03-01T10:00:00Z
steps: []
",
            false,
        )
        .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::ScenarioInvalid);
    }

    #[test]
    fn unknown_step_fails_to_parse() {
        let err = parse_scenario(
            r#"{"dialog": {"id": "t1", "tagId": "t1"}, "steps": [{"step": "explode"}]}"#,
            true,
        )
        .expect_err("unknown step");
        assert_eq!(err.code(), ErrorCode::ScenarioParseError);
    }
}
