//! Agent 活动日志
//!
//! 每次调用记录一行「谁（角色）做了什么」；仅用于可观测性，不参与任何业务判断。

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityEntry {
    pub agent: String,
    pub role: String,
    pub action: String,
    pub at: DateTime<Utc>,
}

/// 追加写的进程内活动日志，Clone 后共享同一份记录
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Arc<Mutex<Vec<ActivityEntry>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, agent: &str, role: &str, action: impl Into<String>) {
        let action = action.into();
        tracing::info!("[{}] {}: {}", role, agent, action);
        let entry = ActivityEntry {
            agent: agent.to_string(),
            role: role.to_string(),
            action,
            at: Utc::now(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 某个 Agent 的全部记录
    pub fn entries_for(&self, agent: &str) -> Vec<ActivityEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.agent == agent)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let log = ActivityLog::new();
        let shared = log.clone();
        shared.record("Aurelius", "Campaign Planner", "Consulting for Awareness strategy");
        log.record("Chronos", "Timeline Manager", "Mapping milestones");

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries_for("Aurelius").len(), 1);
        assert_eq!(log.entries()[1].role, "Timeline Manager");
    }
}
