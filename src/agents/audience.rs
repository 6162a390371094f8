//! Cerebro：受众细分

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};
use crate::agents::SIMULATED_SIGNAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudienceSegment {
    #[schemars(description = "Segment name and one key characteristic")]
    pub segment_name: String,
    pub match_rate: String,
    pub expansion_opportunity: String,
}

impl Validate for AudienceSegment {
    fn validate(&self) -> Result<(), String> {
        if self.segment_name.trim().is_empty() {
            return Err("segment_name is empty".to_string());
        }
        Ok(())
    }
}

pub struct AudienceProfiler;

impl AgentSpec for AudienceProfiler {
    /// 渠道名
    type Input = String;
    type Output = AudienceSegment;
    const NAME: &'static str = "Cerebro";
    const ROLE: &'static str = "Audience Profiler";

    fn action(&self, channel: &String) -> String {
        format!("Profiling audience micro-segments on {channel}")
    }

    fn prompt(&self, channel: &String) -> String {
        format!(
            "Identify a high-value audience micro-segment for {channel} marketing right now.\n\
             Just give the segment name and a key characteristic."
        )
    }

    fn fallback(&self, _channel: &String) -> AudienceSegment {
        AudienceSegment {
            segment_name: SIMULATED_SIGNAL.to_string(),
            match_rate: "High".to_string(),
            expansion_opportunity: "Available".to_string(),
        }
    }
}
