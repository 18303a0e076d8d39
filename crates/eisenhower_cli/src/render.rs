//! Plain-text rendering of tasks, matrix and settings.

use chrono::{DateTime, Utc};
use eisenhower_core::{MatrixView, Quadrant, SettingsSummary, Task};

/// Heading shown above each quadrant section.
pub fn quadrant_heading(quadrant: Quadrant) -> &'static str {
    match quadrant {
        Quadrant::UrgentImportant => "Do first (urgent, important)",
        Quadrant::NotUrgentImportant => "Schedule (not urgent, important)",
        Quadrant::UrgentNotImportant => "Delegate (urgent, not important)",
        Quadrant::NotUrgentNotImportant => "Eliminate (not urgent, not important)",
    }
}

/// One line per task: `[x] #12 Title  due 2024-01-05 (overdue)`.
///
/// A task is overdue from the day after its due date.
pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{mark}] #{} {}", task.id, task.title);
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
        if !task.completed && due.date_naive() < now.date_naive() {
            line.push_str(" (overdue)");
        }
    }
    line
}

pub fn task_list(tasks: &[Task], now: DateTime<Utc>) -> String {
    if tasks.is_empty() {
        return "No tasks.".to_string();
    }
    tasks
        .iter()
        .map(|task| format!("{}  <{}>", task_line(task, now), task.quadrant))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("#{} {}", task.id, task.title),
        format!("quadrant:  {}", task.quadrant),
        format!("completed: {}", task.completed),
    ];
    if let Some(notes) = &task.notes {
        lines.push(format!("notes:     {notes}"));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("due:       {}", due.format("%Y-%m-%d")));
    }
    lines.push(format!("created:   {}", task.created_at.to_rfc3339()));
    lines.push(format!("updated:   {}", task.updated_at.to_rfc3339()));
    lines.join("\n")
}

pub fn matrix(view: &MatrixView, now: DateTime<Utc>) -> String {
    let quadrants = match view.filter {
        Some(quadrant) => vec![quadrant],
        None => Quadrant::ALL.to_vec(),
    };

    let mut sections = Vec::with_capacity(quadrants.len());
    for quadrant in quadrants {
        let tasks = view.tasks(quadrant);
        let mut section = format!("== {} [{}]", quadrant_heading(quadrant), tasks.len());
        for task in tasks {
            section.push('\n');
            section.push_str(&task_line(task, now));
        }
        sections.push(section);
    }
    if !view.show_completed {
        sections.push("(completed tasks hidden)".to_string());
    }
    sections.join("\n\n")
}

pub fn settings(summary: &SettingsSummary) -> String {
    [
        format!("theme:           {}", summary.theme),
        format!("show completed:  {}", summary.show_completed),
        format!("view mode:       {}", summary.view_mode),
        format!("total tasks:     {}", summary.total_tasks),
        format!("completed tasks: {}", summary.completed_tasks),
    ]
    .join("\n")
}
