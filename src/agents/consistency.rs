//! Guardian：跨渠道品牌一致性审计

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AuditStatus {
    Green,
    Amber,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsistencyAudit {
    #[schemars(description = "Float between 0.0 and 1.0")]
    pub consistency_score: f64,
    pub status: AuditStatus,
    #[schemars(description = "A 1-sentence analytical observation regarding brand synchronization")]
    pub audit_note: String,
}

impl Validate for ConsistencyAudit {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.consistency_score) {
            return Err(format!(
                "consistency_score out of [0, 1]: {}",
                self.consistency_score
            ));
        }
        if self.audit_note.trim().is_empty() {
            return Err("audit_note is empty".to_string());
        }
        Ok(())
    }
}

/// 单个渠道上的情绪与互动深度信号
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandSignal {
    pub channel: String,
    pub sentiment_score: f64,
    pub engagement_depth: String,
}

pub struct BrandAuditor;

impl AgentSpec for BrandAuditor {
    type Input = Vec<BrandSignal>;
    type Output = ConsistencyAudit;
    const NAME: &'static str = "Guardian";
    const ROLE: &'static str = "Brand Auditor";

    fn action(&self, signals: &Vec<BrandSignal>) -> String {
        format!("Auditing brand voice across {} channels", signals.len())
    }

    fn prompt(&self, signals: &Vec<BrandSignal>) -> String {
        let summary: Vec<String> = signals
            .iter()
            .map(|s| {
                format!(
                    "{}: Sentiment {}, Engagement {}",
                    s.channel, s.sentiment_score, s.engagement_depth
                )
            })
            .collect();
        format!(
            "Act as a Brand Guardian. Analyze the following campaign performance signals across different platforms\n\
             and judge the consistency of the brand voice and messaging.\n\n\
             Signals: {}",
            summary.join(", ")
        )
    }

    fn fallback(&self, _signals: &Vec<BrandSignal>) -> ConsistencyAudit {
        ConsistencyAudit {
            consistency_score: 0.95,
            status: AuditStatus::Green,
            audit_note: "Brand voice is consistent across all channels.".to_string(),
        }
    }
}
