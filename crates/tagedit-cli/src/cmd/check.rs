//! `tagedit check`: parse and validate a scenario without running it.

use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tagedit_core::scenario::{self, Scenario};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Scenario file (`.yaml`, `.yml` or `.json`).
    pub path: PathBuf,
}

/// Summary of a scenario that passed the static checks.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: String,
    pub dialog: String,
    pub tag_id: String,
    /// Whether the dialog's tag is among the seeded tags.
    pub tag_seeded: bool,
    pub tags: usize,
    pub steps: Vec<&'static str>,
}

impl CheckReport {
    fn new(path: &std::path::Path, scenario: &Scenario) -> Self {
        Self {
            path: path.display().to_string(),
            dialog: scenario.dialog.id.to_string(),
            tag_id: scenario.dialog.tag_id.to_string(),
            tag_seeded: scenario
                .tags
                .iter()
                .any(|t| t.id == scenario.dialog.tag_id),
            tags: scenario.tags.len(),
            steps: scenario.steps.iter().map(scenario::Step::label).collect(),
        }
    }
}

pub fn run_check(args: &CheckArgs, output: OutputMode) -> anyhow::Result<()> {
    let scenario = match scenario::load_scenario(&args.path) {
        Ok(s) => s,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            anyhow::bail!("{e}");
        }
    };

    let report = CheckReport::new(&args.path, &scenario);
    render_mode(output, &report, render_text, render_pretty)
}

fn render_text(r: &CheckReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "ok  {}  dialog={}  tag={}{}  tags={}  steps={}",
        r.path,
        r.dialog,
        r.tag_id,
        if r.tag_seeded { "" } else { "(missing)" },
        r.tags,
        r.steps.len()
    )
}

fn render_pretty(r: &CheckReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Scenario {}", r.path))?;
    pretty_kv(w, "Dialog", &r.dialog)?;
    pretty_kv(
        w,
        "Tag",
        if r.tag_seeded {
            r.tag_id.clone()
        } else {
            format!("{} (not seeded, dialog stays loading)", r.tag_id)
        },
    )?;
    pretty_kv(w, "Seed tags", r.tags.to_string())?;
    pretty_kv(w, "Steps", r.steps.join(" → "))
}
