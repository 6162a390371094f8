//! Metatron：生命周期动作裁决

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};
use crate::campaign::lifecycle::{CampaignStatus, TargetStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleDecision {
    pub new_status: TargetStatus,
    #[serde(alias = "ai_confirmation")]
    #[schemars(description = "A professional 1-sentence confirmation of the state transition log")]
    pub confirmation_message: String,
    #[schemars(description = "Brief explanation of why this transition is logical")]
    pub reasoning: String,
}

impl Validate for LifecycleDecision {
    fn validate(&self) -> Result<(), String> {
        if self.confirmation_message.trim().is_empty() {
            return Err("confirmation_message is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleRequest {
    pub campaign_name: String,
    pub current: CampaignStatus,
    pub action: String,
    /// 规则表的建议（可能为空）
    pub advised: Option<CampaignStatus>,
}

pub struct LifecycleManager;

impl AgentSpec for LifecycleManager {
    type Input = LifecycleRequest;
    type Output = LifecycleDecision;
    const NAME: &'static str = "Metatron";
    const ROLE: &'static str = "Global Orchestrator";

    fn action(&self, req: &LifecycleRequest) -> String {
        format!(
            "Evaluating action '{}' for campaign {}",
            req.action, req.campaign_name
        )
    }

    fn prompt(&self, req: &LifecycleRequest) -> String {
        let advised = req
            .advised
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none (action not applicable in the current state)".to_string());
        format!(
            "Act as a Campaign Lifecycle Manager. Given the current campaign state and a user-requested action,\n\
             determine the new logical status and provide a brief AI signal (confirmation message).\n\n\
             Campaign: {}\n\
             Current Status: {}\n\
             Requested Action: {}\n\
             Rule-based suggestion: {}\n\n\
             Valid Actions and Transitions:\n\
             - \"Launch\", \"Activate\", or \"Resume\": Transition from 'Paused' or 'Draft' to 'Active'.\n\
             - \"Pause\" or \"Halt\": Transition from 'Active' to 'Paused'.\n\
             - \"Terminate\": Transition to 'Terminated' (a terminal state).\n\n\
             Provide a status that is one of: Active, Paused, Terminated.",
            req.campaign_name, req.current, req.action, advised
        )
    }

    fn fallback(&self, _req: &LifecycleRequest) -> LifecycleDecision {
        LifecycleDecision {
            new_status: TargetStatus::Active,
            confirmation_message: "Command authorized. Node status updated to Active.".to_string(),
            reasoning: "Reasoning backend unavailable; defaulting to the authorized command path."
                .to_string(),
        }
    }
}
