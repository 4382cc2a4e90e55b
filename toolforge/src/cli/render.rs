//! Rendering of run details.
//!
//! Table, text block and JSON are all produced from the same [`RunDetail`]
//! tree; nothing here looks at control plane documents.

use crate::ops::{RunDetail, TaskDetail};
use crate::status::{Category, ContainerPhase, ContainerRecord, RunStatusRecord, RUNNING};
use colored::{Color, Colorize};
use serde::Serialize;

const INDENT: &str = "    ";
const COLUMN_GAP: &str = "  ";

pub const LIST_HEADERS: [&str; 10] = [
    "run_image",
    "status",
    "start_time",
    "end_time",
    "source_url",
    "ref",
    "repo_url",
    "image_name",
    "image_tag",
    "builder_image",
];

/// Applies styling, or leaves text untouched when colour is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    use_color: bool,
}

impl Palette {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn bold(&self, text: &str) -> String {
        if self.use_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Bold and coloured.
    pub fn emphasize(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn category_color(category: &Category) -> Color {
    match category {
        Category::Ok | Category::Cancelled => Color::Green,
        Category::Error => Color::Red,
        Category::NotStarted | Category::Other(_) => Color::Yellow,
    }
}

fn list_category_color(category: &Category) -> Color {
    match category {
        Category::NotStarted => Color::White,
        other => category_color(other),
    }
}

fn phase_color(phase: ContainerPhase) -> Color {
    match phase {
        ContainerPhase::Ok | ContainerPhase::Cancelled => Color::Green,
        ContainerPhase::Waiting | ContainerPhase::Running => Color::White,
        ContainerPhase::Error => Color::Red,
        ContainerPhase::Unknown => Color::Yellow,
    }
}

/// One row per run, columns padded to the widest cell.
pub fn runs_table(runs: &[RunDetail], palette: Palette) -> String {
    let header: Vec<Cell> = LIST_HEADERS
        .iter()
        .map(|title| Cell::new(title, palette.bold(title)))
        .collect();
    let mut rows = vec![header];
    rows.extend(runs.iter().map(|run| list_row(run, palette)));

    let mut widths = vec![0; LIST_HEADERS.len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width);
        }
    }

    let mut out = String::new();
    for row in &rows {
        let last = row.len() - 1;
        let mut line = String::new();
        for (i, (cell, width)) in row.iter().zip(&widths).enumerate() {
            line.push_str(&cell.styled);
            if i < last {
                line.push_str(&" ".repeat(width - cell.width));
                line.push_str(COLUMN_GAP);
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

struct Cell {
    width: usize,
    styled: String,
}

impl Cell {
    fn new(plain: &str, styled: String) -> Self {
        Self {
            width: plain.chars().count(),
            styled,
        }
    }

    fn plain(text: &str) -> Self {
        Self::new(text, text.to_string())
    }
}

fn list_row(run: &RunDetail, palette: Palette) -> Vec<Cell> {
    let status = run.status.status.as_str();
    let params = &run.params;
    vec![
        Cell::plain(&run.name),
        Cell::new(
            status,
            palette.paint(status, list_category_color(&run.status.status)),
        ),
        Cell::plain(&run.status.start_time),
        Cell::plain(&run.status.end_time),
        Cell::plain(&params.source_url),
        Cell::plain(&params.git_ref),
        Cell::plain(&params.repo_url),
        Cell::plain(&params.image_name),
        Cell::plain(&params.image_tag),
        Cell::plain(&params.builder_image),
    ]
}

fn status_lines(status: &RunStatusRecord, palette: Palette) -> Vec<String> {
    let end_time = if status.end_time == RUNNING {
        palette.paint(&status.end_time, Color::Green)
    } else {
        status.end_time.clone()
    };
    let category = palette.paint(status.status.as_str(), category_color(&status.status));

    vec![
        format!("{} {}", palette.bold("Start time:"), status.start_time),
        format!("{} {}", palette.bold("End time:"), end_time),
        format!("{} {} ({})", palette.bold("Status:"), category, status.reason),
        format!("{} {}", palette.bold("Message:"), status.message),
    ]
}

fn container_line(label: &str, record: &ContainerRecord, palette: Palette) -> String {
    format!(
        "{} {} - {} ({})",
        palette.bold(label),
        record.name,
        palette.paint(record.status.as_str(), phase_color(record.status)),
        record.reason
    )
}

fn indented(line: &str, depth: usize) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{}", INDENT.repeat(depth), line)
    }
}

fn task_lines(task: &TaskDetail, palette: Palette) -> Vec<String> {
    let mut lines = vec![format!("{} {}", palette.bold("Task:"), task.task_name)];
    lines.extend(
        status_lines(&task.status, palette)
            .iter()
            .map(|line| indented(line, 1)),
    );
    lines.push(String::new());

    if let Some(steps) = &task.steps {
        lines.push(indented(&palette.bold("Steps:"), 1));
        lines.extend(
            steps
                .iter()
                .map(|step| indented(&container_line("Step:", step, palette), 2)),
        );
        lines.push(String::new());
    }

    if let Some(init_containers) = &task.init_containers {
        lines.push(indented(&palette.bold("Init containers:"), 1));
        lines.extend(init_containers.iter().map(|container| {
            indented(&container_line("Init-container:", container, palette), 2)
        }));
    }

    lines
}

/// Human readable description of a run, with the task tree when present.
pub fn run_block(run: &RunDetail, palette: Palette) -> String {
    let mut out = format!(
        "{} {}\n",
        palette.bold("Name:"),
        palette.paint(&run.name, Color::Blue)
    );
    for line in status_lines(&run.status, palette) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&palette.bold("Parameters:"));
    out.push('\n');
    let params = &run.params;
    for (key, value) in [
        ("source_url:", &params.source_url),
        ("ref:", &params.git_ref),
        ("image_name:", &params.image_name),
        ("image_tag:", &params.image_tag),
        ("repo_url:", &params.repo_url),
        ("builder_image:", &params.builder_image),
    ] {
        out.push_str(&format!("{}{} {}\n", INDENT, palette.bold(key), value));
    }

    if let Some(tasks) = &run.tasks {
        out.push_str(&palette.bold("Tasks:"));
        out.push('\n');
        let lines: Vec<String> = tasks
            .iter()
            .flat_map(|task| task_lines(task, palette))
            .map(|line| indented(&line, 1))
            .collect();
        out.push_str(&lines.join("\n"));
        out.push('\n');
    }

    out
}

/// Pretty JSON with four-space indentation.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::RunParams;
    use pretty_assertions::assert_eq;

    fn detail() -> RunDetail {
        RunDetail {
            name: "mytool-buildpacks-pipelinerun-abcde".to_string(),
            status: RunStatusRecord::not_started(),
            params: RunParams {
                image_name: "web".to_string(),
                image_tag: "latest".to_string(),
                repo_url: "harbor.example.org/mytool".to_string(),
                source_url: "https://example.org/src.git".to_string(),
                git_ref: "no ref".to_string(),
                builder_image: "builder:22".to_string(),
            },
            tasks: None,
        }
    }

    #[test]
    fn block_without_tasks() {
        let expected = "\
Name: mytool-buildpacks-pipelinerun-abcde
Start time: pending
End time: N/A
Status: not_started (N/A)
Message: N/A
Parameters:
    source_url: https://example.org/src.git
    ref: no ref
    image_name: web
    image_tag: latest
    repo_url: harbor.example.org/mytool
    builder_image: builder:22
";
        assert_eq!(run_block(&detail(), Palette::plain()), expected);
    }

    #[test]
    fn table_columns_are_aligned() {
        let table = runs_table(&[detail()], Palette::plain());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("run_image"));
        let status_column = lines[0].find("status").unwrap();
        assert_eq!(&lines[1][status_column..status_column + 11], "not_started");
    }

    #[test]
    fn json_uses_four_spaces_and_skips_missing_tasks() {
        let json = to_json(&detail()).unwrap();
        assert!(json.starts_with("{\n    \"name\": "));
        assert!(!json.contains("\"tasks\""));
        assert!(json.contains("\"ref\": \"no ref\""));
    }
}
