//! 活动生命周期状态机
//!
//! ```text
//! Draft ──▶ Active ◀──▶ Paused
//!   │         │           │
//!   └─────────┴───────────┴──▶ Terminated（终态）
//! ```
//!
//! `advise` 给出规则表下的建议目标状态，只作为上下文写入 LifecycleManager 的 prompt；
//! 最终状态由 Agent（或其兜底结果）决定，唯一硬约束是 Terminated 没有出边。

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::HiveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Terminated,
}

impl CampaignStatus {
    pub fn is_terminal(self) -> bool {
        self == Self::Terminated
    }

    /// 状态图中的合法边
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Active, Paused)
                | (Paused, Active)
                | (Draft, Terminated)
                | (Active, Terminated)
                | (Paused, Terminated)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = HiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "terminated" => Ok(Self::Terminated),
            other => Err(HiveError::Validation(format!("unknown campaign status: {other}"))),
        }
    }
}

/// LifecycleManager 可以给出的目标状态（不含 Draft）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum TargetStatus {
    Active,
    Paused,
    Terminated,
}

impl From<TargetStatus> for CampaignStatus {
    fn from(t: TargetStatus) -> Self {
        match t {
            TargetStatus::Active => Self::Active,
            TargetStatus::Paused => Self::Paused,
            TargetStatus::Terminated => Self::Terminated,
        }
    }
}

/// 用户请求的生命周期动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Launch,
    Activate,
    Resume,
    Pause,
    Halt,
    Terminate,
}

impl LifecycleAction {
    /// 不区分大小写；未知动作返回 None（仍交给 Agent 判断）
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_ascii_lowercase().as_str() {
            "launch" => Some(Self::Launch),
            "activate" => Some(Self::Activate),
            "resume" => Some(Self::Resume),
            "pause" => Some(Self::Pause),
            "halt" => Some(Self::Halt),
            "terminate" => Some(Self::Terminate),
            _ => None,
        }
    }
}

/// 规则表下的建议目标状态；动作未知或当前状态不允许时返回 None
pub fn advise(current: CampaignStatus, action: &str) -> Option<CampaignStatus> {
    use CampaignStatus::*;
    let action = LifecycleAction::parse(action)?;
    let target = match action {
        LifecycleAction::Launch | LifecycleAction::Activate | LifecycleAction::Resume => Active,
        LifecycleAction::Pause | LifecycleAction::Halt => Paused,
        LifecycleAction::Terminate => Terminated,
    };
    current.can_transition_to(target).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CampaignStatus; 4] = [
        CampaignStatus::Draft,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Terminated,
    ];

    #[test]
    fn test_advise_rule_map() {
        use CampaignStatus::*;
        assert_eq!(advise(Draft, "Launch"), Some(Active));
        assert_eq!(advise(Paused, "resume"), Some(Active));
        assert_eq!(advise(Active, "Halt"), Some(Paused));
        assert_eq!(advise(Draft, "Pause"), None);
        assert_eq!(advise(Active, "Terminate"), Some(Terminated));
        assert_eq!(advise(Active, "Celebrate"), None);
    }

    #[test]
    fn test_terminated_has_no_outgoing_edges() {
        for next in ALL {
            assert!(!CampaignStatus::Terminated.can_transition_to(next));
        }
        for action in ["Launch", "Activate", "Resume", "Pause", "Halt", "Terminate"] {
            assert_eq!(advise(CampaignStatus::Terminated, action), None);
        }
    }

    #[test]
    fn test_nothing_returns_to_draft() {
        for from in ALL {
            assert!(!from.can_transition_to(CampaignStatus::Draft));
        }
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("paused".parse::<CampaignStatus>().unwrap(), CampaignStatus::Paused);
        assert!("Suspended".parse::<CampaignStatus>().is_err());
        assert_eq!(CampaignStatus::from(TargetStatus::Terminated).to_string(), "Terminated");
    }
}
