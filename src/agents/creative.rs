//! DaVinci：创意优化建议

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};
use crate::agents::SIMULATED_SIGNAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreativeSuggestion {
    #[schemars(description = "One specific creative improvement, e.g. 'Switch to UGC video'")]
    pub recommendation: String,
    #[schemars(description = "Expected uplift range, e.g. '15-20%'")]
    pub expected_uplift: String,
    pub action_type: String,
}

impl Validate for CreativeSuggestion {
    fn validate(&self) -> Result<(), String> {
        if self.recommendation.trim().is_empty() {
            return Err("recommendation is empty".to_string());
        }
        if self.action_type.trim().is_empty() {
            return Err("action_type is empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreativeBrief {
    pub channel: String,
    /// 当前表现的文字描述
    pub performance: String,
}

pub struct CreativeOptimizer;

impl AgentSpec for CreativeOptimizer {
    type Input = CreativeBrief;
    type Output = CreativeSuggestion;
    const NAME: &'static str = "DaVinci";
    const ROLE: &'static str = "Creative Optimiser";

    fn action(&self, brief: &CreativeBrief) -> String {
        format!("Reviewing creatives on {}", brief.channel)
    }

    fn prompt(&self, brief: &CreativeBrief) -> String {
        format!(
            "Act as a Creative Director.\n\
             Platform: {}\n\
             Current Performance: {}\n\n\
             Suggest one specific creative improvement (e.g., \"Switch to UGC video\", \"Use brighter contrast\").",
            brief.channel, brief.performance
        )
    }

    fn fallback(&self, _brief: &CreativeBrief) -> CreativeSuggestion {
        CreativeSuggestion {
            recommendation: SIMULATED_SIGNAL.to_string(),
            expected_uplift: "15-20%".to_string(),
            action_type: "Creative Swap".to_string(),
        }
    }
}
