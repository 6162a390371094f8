//! Chronos：执行时间线

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Milestone {
    pub milestone: String,
    #[schemars(description = "Date formatted as YYYY-MM-DD")]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionTimeline {
    #[schemars(description = "Exactly 4 milestones in chronological order")]
    pub execution_timeline: Vec<Milestone>,
    pub duration_days: u32,
}

impl ExecutionTimeline {
    pub fn restored(duration_days: u32) -> Self {
        Self {
            execution_timeline: Vec::new(),
            duration_days,
        }
    }
}

impl Validate for ExecutionTimeline {
    fn validate(&self) -> Result<(), String> {
        if self.execution_timeline.len() != 4 {
            return Err(format!(
                "expected 4 milestones, got {}",
                self.execution_timeline.len()
            ));
        }
        for m in &self.execution_timeline {
            NaiveDate::parse_from_str(&m.date, "%Y-%m-%d")
                .map_err(|e| format!("milestone {} has bad date {}: {}", m.milestone, m.date, e))?;
        }
        if self.duration_days == 0 {
            return Err("duration_days must be positive".to_string());
        }
        Ok(())
    }
}

pub struct TimelineManager;

impl AgentSpec for TimelineManager {
    /// 排期起始日
    type Input = NaiveDate;
    type Output = ExecutionTimeline;
    const NAME: &'static str = "Chronos";
    const ROLE: &'static str = "Timeline Manager";

    fn action(&self, start: &NaiveDate) -> String {
        format!("Mapping a 30-day execution timeline from {start}")
    }

    fn prompt(&self, start: &NaiveDate) -> String {
        format!(
            "Generate a realistic 30-day marketing campaign execution timeline.\n\
             Include exactly 4 milestones with dates starting from {}.",
            start.format("%Y-%m-%d")
        )
    }

    fn fallback(&self, _start: &NaiveDate) -> ExecutionTimeline {
        let phases = [
            ("Phase 1: Launch", "2024-01-01"),
            ("Phase 2: Optimization", "2024-01-10"),
            ("Phase 3: Scaling", "2024-01-20"),
            ("Phase 4: Review", "2024-01-30"),
        ];
        ExecutionTimeline {
            execution_timeline: phases
                .into_iter()
                .map(|(milestone, date)| Milestone {
                    milestone: milestone.to_string(),
                    date: date.to_string(),
                })
                .collect(),
            duration_days: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::parse_document;

    #[test]
    fn test_fallback_is_fixed() {
        let a = TimelineManager.fallback(&NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let b = TimelineManager.fallback(&NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(a, b);
        assert!(a.validate().is_ok());
        assert_eq!(a.execution_timeline[3].date, "2024-01-30");
    }

    #[test]
    fn test_rejects_bad_date() {
        let raw = r#"{"execution_timeline":[
            {"milestone":"a","date":"2024-01-01"},
            {"milestone":"b","date":"next week"},
            {"milestone":"c","date":"2024-01-20"},
            {"milestone":"d","date":"2024-01-30"}],"duration_days":30}"#;
        assert!(parse_document::<ExecutionTimeline>(raw).is_err());
    }
}
