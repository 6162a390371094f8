//! Navigator：渠道预算拆分建议

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChannelRecommendation {
    #[schemars(description = "Budget share per platform name, each a float between 0 and 1")]
    pub platform_split: BTreeMap<String, f64>,
    #[schemars(description = "Brief explanation for this allocation")]
    pub reasoning: String,
}

impl ChannelRecommendation {
    pub fn restored(channels: &[String]) -> Self {
        let share = if channels.is_empty() {
            0.0
        } else {
            1.0 / channels.len() as f64
        };
        Self {
            platform_split: channels.iter().map(|c| (c.clone(), share)).collect(),
            reasoning: "Restored from platform data".to_string(),
        }
    }
}

impl Validate for ChannelRecommendation {
    fn validate(&self) -> Result<(), String> {
        if self.platform_split.is_empty() {
            return Err("platform_split is empty".to_string());
        }
        if let Some((name, share)) = self
            .platform_split
            .iter()
            .find(|(_, s)| !(0.0..=1.0).contains(*s))
        {
            return Err(format!("share for {name} out of [0, 1]: {share}"));
        }
        let total: f64 = self.platform_split.values().sum();
        // 允许模型四舍五入带来的少量溢出
        if total > 1.05 {
            return Err(format!("shares sum to {total:.2}"));
        }
        Ok(())
    }
}

pub struct Recommender;

impl AgentSpec for Recommender {
    /// 活动目标
    type Input = String;
    type Output = ChannelRecommendation;
    const NAME: &'static str = "Navigator";
    const ROLE: &'static str = "Channel Specialist";

    fn action(&self, objective: &String) -> String {
        format!("Analyzing channel fit for {objective}")
    }

    fn prompt(&self, objective: &String) -> String {
        format!(
            "Analyze marketing platform performance for the following goal: {objective}.\n\
             Platforms available: Instagram, Facebook, Twitter, Google Ads, Email.\n\n\
             Provide an optimal budget split (percentage) and a brief reasoning for this selection."
        )
    }

    fn fallback(&self, _objective: &String) -> ChannelRecommendation {
        ChannelRecommendation {
            platform_split: BTreeMap::from([
                ("Instagram".to_string(), 0.4),
                ("Facebook".to_string(), 0.3),
                ("Google Ads".to_string(), 0.3),
            ]),
            reasoning: "Historical data suggests high engagement on visual platforms for this objective."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::parse_document;

    #[test]
    fn test_fallback_split() {
        let rec = Recommender.fallback(&"Sales".to_string());
        assert!(rec.validate().is_ok());
        assert_eq!(rec.platform_split["Instagram"], 0.4);
        assert_eq!(rec.platform_split.len(), 3);
    }

    #[test]
    fn test_rejects_percentages() {
        let raw = r#"{"platform_split":{"Instagram":40,"Email":60},"reasoning":"r"}"#;
        assert!(parse_document::<ChannelRecommendation>(raw).is_err());
    }

    #[test]
    fn test_restored_even_split() {
        let rec = ChannelRecommendation::restored(&["Email".into(), "Twitter".into()]);
        assert_eq!(rec.platform_split["Email"], 0.5);
    }
}
