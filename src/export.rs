// 📤 CSV Export - goal list as a spreadsheet

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::goals::Goal;
use crate::render::goal_progress;

#[derive(Debug, Serialize)]
struct GoalRow<'a> {
    #[serde(rename = "Id")]
    id: &'a str,

    #[serde(rename = "Name")]
    name: &'a str,

    #[serde(rename = "Priority")]
    priority: &'static str,

    #[serde(rename = "Amount")]
    amount: u64,

    #[serde(rename = "Target")]
    target: u64,

    #[serde(rename = "Progress_Percent")]
    progress_percent: u16,
}

/// Write every goal (in list order) and return how many rows were written
pub fn write_goals_csv<W: Write>(goals: &[Goal], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);

    for goal in goals {
        wtr.serialize(GoalRow {
            id: &goal.id,
            name: &goal.name,
            priority: goal.priority.as_str(),
            amount: goal.amount,
            target: goal.target,
            progress_percent: goal_progress(goal).percent(),
        })
        .with_context(|| format!("Failed to write goal {}", goal.id))?;
    }

    wtr.flush().context("Failed to flush CSV")?;
    Ok(goals.len())
}

pub fn export_goals(goals: &[Goal], path: &Path) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_goals_csv(goals, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::Priority;

    #[test]
    fn test_write_goals_csv() {
        let goals = vec![
            Goal {
                id: "g1".to_string(),
                name: "Laptop, new".to_string(),
                amount: 250,
                target: 1000,
                priority: Priority::High,
            },
            Goal {
                id: "g2".to_string(),
                name: "Trip".to_string(),
                amount: 30,
                target: 30,
                priority: Priority::Low,
            },
        ];

        let mut buf = Vec::new();
        let written = write_goals_csv(&goals, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(written, 2);
        assert_eq!(lines[0], "Id,Name,Priority,Amount,Target,Progress_Percent");
        assert_eq!(lines[1], "g1,\"Laptop, new\",High,250,1000,25");
        assert_eq!(lines[2], "g2,Trip,Low,30,30,100");
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let mut buf = Vec::new();
        assert_eq!(write_goals_csv(&[], &mut buf).unwrap(), 0);
        assert!(buf.is_empty());
    }
}
