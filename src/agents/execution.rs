//! Broadcast：渠道部署确认

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};
use crate::agents::SIMULATED_SIGNAL;

pub const DEPLOYED: &str = "Deployed & Verified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BroadcastLog {
    pub broadcast_status: String,
    #[schemars(description = "Deployment status keyed by every requested platform")]
    pub deployments: BTreeMap<String, String>,
    pub confirmation_code: String,
    #[schemars(description = "A short, professional 1-sentence broadcast confirmation")]
    pub ai_signal: String,
}

impl BroadcastLog {
    pub fn restored(channels: &[String]) -> Self {
        Self {
            broadcast_status: "Restored".to_string(),
            deployments: channels
                .iter()
                .map(|c| (c.clone(), "Restored from platform data".to_string()))
                .collect(),
            confirmation_code: String::new(),
            ai_signal: String::new(),
        }
    }
}

impl Validate for BroadcastLog {
    fn validate(&self) -> Result<(), String> {
        if self.broadcast_status.trim().is_empty() {
            return Err("broadcast_status is empty".to_string());
        }
        if self.confirmation_code.trim().is_empty() {
            return Err("confirmation_code is empty".to_string());
        }
        Ok(())
    }
}

pub struct ExecutionLead;

impl AgentSpec for ExecutionLead {
    /// 待部署渠道
    type Input = Vec<String>;
    type Output = BroadcastLog;
    const NAME: &'static str = "Broadcast";
    const ROLE: &'static str = "Execution Lead";

    fn action(&self, channels: &Vec<String>) -> String {
        format!("Broadcasting to {}", channels.join(", "))
    }

    fn prompt(&self, channels: &Vec<String>) -> String {
        format!(
            "Confirm the deployment of a marketing campaign to these platforms: {}.\n\
             Report a deployment status for every platform, a confirmation code, and a short, \
             professional 1-sentence broadcast confirmation.",
            channels.join(", ")
        )
    }

    fn fallback(&self, channels: &Vec<String>) -> BroadcastLog {
        BroadcastLog {
            broadcast_status: "Success".to_string(),
            deployments: channels
                .iter()
                .map(|c| (c.clone(), DEPLOYED.to_string()))
                .collect(),
            confirmation_code: "TX-00000-SIM".to_string(),
            ai_signal: SIMULATED_SIGNAL.to_string(),
        }
    }

    /// 部署清单必须恰好覆盖请求的渠道
    fn check(&self, channels: &Vec<String>, log: &BroadcastLog) -> Result<(), String> {
        let requested: BTreeSet<&str> = channels.iter().map(String::as_str).collect();
        let reported: BTreeSet<&str> = log.deployments.keys().map(String::as_str).collect();
        if requested != reported {
            return Err(format!(
                "deployments cover {:?}, requested {:?}",
                reported, requested
            ));
        }
        Ok(())
    }
}
