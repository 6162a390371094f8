//! Ledger：预算再分配

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};
use crate::agents::SIMULATED_SIGNAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetReallocation {
    pub action: String,
    #[schemars(description = "Short justification for the reallocation")]
    pub justification: String,
    #[schemars(description = "Projected savings as a number formatted with 2 decimals")]
    pub savings_projected: String,
    pub new_allocation_signal: String,
}

impl Validate for BudgetReallocation {
    fn validate(&self) -> Result<(), String> {
        if self.action.trim().is_empty() || self.justification.trim().is_empty() {
            return Err("action and justification are required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBrief {
    pub current_budget: f64,
    /// 渠道 -> 当前花费
    pub breakdown: BTreeMap<String, f64>,
}

pub struct BudgetOptimizer;

impl AgentSpec for BudgetOptimizer {
    type Input = BudgetBrief;
    type Output = BudgetReallocation;
    const NAME: &'static str = "Ledger";
    const ROLE: &'static str = "Capital Allocator";

    fn action(&self, brief: &BudgetBrief) -> String {
        format!(
            "Rebalancing {} across {} channels",
            brief.current_budget,
            brief.breakdown.len()
        )
    }

    fn prompt(&self, brief: &BudgetBrief) -> String {
        let allocation: Vec<String> = brief
            .breakdown
            .iter()
            .map(|(channel, spend)| format!("{channel}: {spend}"))
            .collect();
        format!(
            "Optimize a marketing budget of {}.\n\
             Current allocation: {}\n\n\
             Goal: Reduce wasted spend and increase result spread.\n\
             Return a short justification for a reallocation.",
            brief.current_budget,
            allocation.join(", ")
        )
    }

    fn fallback(&self, brief: &BudgetBrief) -> BudgetReallocation {
        BudgetReallocation {
            action: "Reallocation Triggered".to_string(),
            justification: SIMULATED_SIGNAL.to_string(),
            savings_projected: format!("{:.2}", brief.current_budget * 0.12),
            new_allocation_signal: "Sent to Orchestrator".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_savings_depend_on_budget() {
        let brief = BudgetBrief {
            current_budget: 12345.0,
            breakdown: BTreeMap::from([("Email".to_string(), 400.0)]),
        };
        let out = BudgetOptimizer.fallback(&brief);
        assert_eq!(out.savings_projected, "1481.40");
        assert_eq!(out.new_allocation_signal, "Sent to Orchestrator");
        assert!(BudgetOptimizer.prompt(&brief).contains("Email: 400"));
    }
}
