//! ProfitMax：ROI 预测

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RoiForecast {
    #[schemars(description = "Projected ROI multiplier, e.g. 3.4")]
    pub projected_roi: f64,
    pub projected_revenue: f64,
    pub projected_conversions: u64,
    #[schemars(description = "Percentage string, e.g. '85%'")]
    pub confidence_score: String,
}

impl RoiForecast {
    pub fn restored() -> Self {
        Self {
            projected_roi: 0.0,
            projected_revenue: 0.0,
            projected_conversions: 0,
            confidence_score: "0%".to_string(),
        }
    }

    /// 解析 "NN%" 形式的置信度
    pub fn confidence_percent(&self) -> Option<u8> {
        parse_percent(&self.confidence_score)
    }
}

/// "85%" -> 85；超过 100 或格式不符返回 None
pub fn parse_percent(text: &str) -> Option<u8> {
    let value: u8 = text.trim().strip_suffix('%')?.trim().parse().ok()?;
    (value <= 100).then_some(value)
}

impl Validate for RoiForecast {
    fn validate(&self) -> Result<(), String> {
        if !self.projected_roi.is_finite() || self.projected_roi < 0.0 {
            return Err(format!("projected_roi invalid: {}", self.projected_roi));
        }
        if !self.projected_revenue.is_finite() || self.projected_revenue < 0.0 {
            return Err(format!("projected_revenue invalid: {}", self.projected_revenue));
        }
        if self.confidence_percent().is_none() {
            return Err(format!("confidence_score not a percentage: {}", self.confidence_score));
        }
        Ok(())
    }
}

pub struct RoiAnalyst;

impl AgentSpec for RoiAnalyst {
    /// 预算
    type Input = f64;
    type Output = RoiForecast;
    const NAME: &'static str = "ProfitMax";
    const ROLE: &'static str = "ROI Analyst";

    fn action(&self, budget: &f64) -> String {
        format!("Forecasting returns for a budget of {budget}")
    }

    fn prompt(&self, budget: &f64) -> String {
        format!(
            "Perform a financial forecast for a marketing campaign with a budget of ₹{budget}.\n\
             Calculate potential ROI and conversion estimates based on current mid-market digital marketing benchmarks."
        )
    }

    fn fallback(&self, _budget: &f64) -> RoiForecast {
        RoiForecast {
            projected_roi: 2.8,
            projected_revenue: 140000.0,
            projected_conversions: 350,
            confidence_score: "88%".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::base::parse_document;

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("85%"), Some(85));
        assert_eq!(parse_percent(" 100 % "), Some(100));
        assert_eq!(parse_percent("101%"), None);
        assert_eq!(parse_percent("High"), None);
        assert_eq!(parse_percent("85"), None);
    }

    #[test]
    fn test_fallback_literal() {
        let f = RoiAnalyst.fallback(&5000.0);
        assert!(f.validate().is_ok());
        assert_eq!(f.projected_roi, 2.8);
        assert_eq!(f.confidence_percent(), Some(88));
    }

    #[test]
    fn test_rejects_negative_roi() {
        let raw = r#"{"projected_roi":-1.0,"projected_revenue":10.0,"projected_conversions":3,"confidence_score":"50%"}"#;
        assert!(parse_document::<RoiForecast>(raw).is_err());
    }
}
