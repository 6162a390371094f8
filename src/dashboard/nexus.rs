//! 全局健康度摘要（由 ROI 阈值确定性推出，不调用推理后端）

use serde::Serialize;

use crate::registry::safe_div;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NexusInsight {
    pub global_insight: String,
    pub health_score: u32,
    pub trend_analysis: String,
}

impl NexusInsight {
    pub fn from_totals(spend: f64, revenue: f64) -> Self {
        let roi = safe_div(revenue, spend);
        let (insight, trend) = if roi > 3.0 {
            (
                "Exceptional efficiency detected; scale budget on high-performing nodes.",
                "Surge",
            )
        } else if roi > 1.5 {
            (
                "Healthy growth trajectory confirmed across active channels.",
                "Positive Yield Trajectory",
            )
        } else if roi > 0.0 {
            (
                "Optimization required to improve yield ratios above baseline.",
                "Stabilizing",
            )
        } else {
            ("Awaiting initial performance data signal.", "Initializing")
        };

        let health_score = if roi > 0.0 {
            ((roi * 25.0).floor() as u32).min(98)
        } else {
            50
        };

        Self {
            global_insight: insight.to_string(),
            health_score,
            trend_analysis: trend.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(NexusInsight::from_totals(100.0, 350.0).trend_analysis, "Surge");
        assert_eq!(NexusInsight::from_totals(100.0, 350.0).health_score, 87);
        assert_eq!(
            NexusInsight::from_totals(100.0, 200.0).trend_analysis,
            "Positive Yield Trajectory"
        );
        assert_eq!(NexusInsight::from_totals(400.0, 500.0).health_score, 31);
        assert_eq!(NexusInsight::from_totals(400.0, 500.0).trend_analysis, "Stabilizing");
        assert_eq!(NexusInsight::from_totals(100.0, 1000.0).health_score, 98);
    }

    #[test]
    fn test_no_spend() {
        let n = NexusInsight::from_totals(0.0, 0.0);
        assert_eq!(n.trend_analysis, "Initializing");
        assert_eq!(n.health_score, 50);
    }
}
