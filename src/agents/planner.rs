//! Aurelius：活动策略规划

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// 策略概要 + 4 个里程碑 + 优先级
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrategyPlan {
    #[schemars(description = "A concise 1-2 sentence strategic overview")]
    pub strategy: String,
    #[schemars(description = "Exactly 4 key milestones with descriptive names")]
    pub milestones: Vec<String>,
    #[schemars(description = "Priority based on budget and objective complexity")]
    pub priority: Priority,
}

impl StrategyPlan {
    /// 从渠道数据恢复的孤儿活动没有规划过程，只保留一句说明
    pub fn restored() -> Self {
        Self {
            strategy: "Restored from platform data".to_string(),
            milestones: Vec::new(),
            priority: Priority::Medium,
        }
    }
}

impl Validate for StrategyPlan {
    fn validate(&self) -> Result<(), String> {
        if self.strategy.trim().is_empty() {
            return Err("strategy is empty".to_string());
        }
        if self.milestones.len() != 4 {
            return Err(format!("expected 4 milestones, got {}", self.milestones.len()));
        }
        if self.milestones.iter().any(|m| m.trim().is_empty()) {
            return Err("milestone name is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanningBrief {
    pub objective: String,
    pub budget: f64,
}

pub struct Planner;

impl AgentSpec for Planner {
    type Input = PlanningBrief;
    type Output = StrategyPlan;
    const NAME: &'static str = "Aurelius";
    const ROLE: &'static str = "Campaign Planner";

    fn action(&self, input: &PlanningBrief) -> String {
        format!("Consulting reasoning backend for {} strategy", input.objective)
    }

    fn prompt(&self, input: &PlanningBrief) -> String {
        format!(
            "Act as an elite marketing strategist. Generate a high-level roadmap and milestones for a campaign.\n\
             Objective: {}\n\
             Budget: ₹{}\n\n\
             The strategy should be data-driven and phased.",
            input.objective, input.budget
        )
    }

    fn fallback(&self, _input: &PlanningBrief) -> StrategyPlan {
        StrategyPlan {
            strategy: "Simulated Strategic Node: AI-driven optimization enabled.".to_string(),
            milestones: ["Initiation", "Market Penetration", "Scale", "Review"]
                .into_iter()
                .map(String::from)
                .collect(),
            priority: Priority::High,
        }
    }
}
