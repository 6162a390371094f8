//! Strategist：基于跨渠道表现分析给出两条策略决策
//!
//! 输出固定为两条：先 Cost Reduction，后 Results Optimization。
//! 兜底结果由分析数据确定性生成（最差 CPC 渠道、最佳 ROI 渠道、总花费）。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agents::base::{AgentSpec, Validate};

/// ROI 低于此值视为表现不佳
pub const UNDERPERFORMING_ROI: f64 = 1.5;
/// ROI 高于此值视为高表现
pub const HIGH_PERFORMING_ROI: f64 = 2.0;

/// 单渠道表现（比率由计数重算）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPerformance {
    pub platform: String,
    pub cost: f64,
    pub roi: f64,
    pub cpc: f64,
    pub ctr: f64,
    pub conversions: u64,
    pub revenue: f64,
}

/// 喂给 InsightsEngine 的表现分析
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceAnalysis {
    pub total_platforms: usize,
    pub platform_performance: Vec<ChannelPerformance>,
    pub total_spend: f64,
    pub avg_roi: f64,
    pub worst_cpc_platform: Option<String>,
    pub best_roi_platform: Option<String>,
    pub highest_ctr_platform: Option<String>,
    pub underperforming: Vec<String>,
    pub high_performers: Vec<String>,
}

impl PerformanceAnalysis {
    pub fn from_channels(channels: Vec<ChannelPerformance>) -> Self {
        let total_spend: f64 = channels.iter().map(|c| c.cost).sum();
        let total_revenue: f64 = channels.iter().map(|c| c.revenue).sum();

        let mut best_roi: Option<&ChannelPerformance> = None;
        let mut worst_cpc: Option<&ChannelPerformance> = None;
        let mut highest_ctr: Option<&ChannelPerformance> = None;
        for c in &channels {
            if best_roi.map_or(true, |b| c.roi > b.roi) {
                best_roi = Some(c);
            }
            // 第一个渠道先占位，之后只接受更高的正 CPC
            if worst_cpc.map_or(true, |w| c.cpc > 0.0 && c.cpc > w.cpc) {
                worst_cpc = Some(c);
            }
            if highest_ctr.map_or(true, |h| c.ctr > h.ctr) {
                highest_ctr = Some(c);
            }
        }

        Self {
            total_platforms: channels.len(),
            total_spend,
            avg_roi: if total_spend > 0.0 {
                total_revenue / total_spend
            } else {
                0.0
            },
            worst_cpc_platform: worst_cpc.map(|c| c.platform.clone()),
            best_roi_platform: best_roi.map(|c| c.platform.clone()),
            highest_ctr_platform: highest_ctr.map(|c| c.platform.clone()),
            underperforming: channels
                .iter()
                .filter(|c| c.roi < UNDERPERFORMING_ROI)
                .map(|c| c.platform.clone())
                .collect(),
            high_performers: channels
                .iter()
                .filter(|c| c.roi > HIGH_PERFORMING_ROI)
                .map(|c| c.platform.clone())
                .collect(),
            platform_performance: channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.platform_performance.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DecisionKind {
    #[serde(rename = "Cost Reduction")]
    CostReduction,
    #[serde(rename = "Results Optimization")]
    ResultsOptimization,
}

impl DecisionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CostReduction => "Cost Reduction",
            Self::ResultsOptimization => "Results Optimization",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceSummary {
    #[schemars(description = "3-4 sentence analysis with specific metrics and the recommended saving or scaling opportunity")]
    pub summary: String,
    pub winning_segment: String,
    pub sentiment_leader: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetAction {
    #[schemars(description = "Specific action, e.g. 'Reduce Twitter spend by 40%'")]
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrategicDecision {
    pub decision_type: DecisionKind,
    pub performance_analysis: PerformanceSummary,
    pub budget_optimization: BudgetAction,
}

/// 恰好两条：Cost Reduction、Results Optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StrategicDecisions(pub Vec<StrategicDecision>);

impl Validate for StrategicDecisions {
    fn validate(&self) -> Result<(), String> {
        let kinds: Vec<DecisionKind> = self.0.iter().map(|d| d.decision_type).collect();
        if kinds != [DecisionKind::CostReduction, DecisionKind::ResultsOptimization] {
            return Err(format!(
                "expected [Cost Reduction, Results Optimization], got {:?}",
                kinds
            ));
        }
        if self.0.iter().any(|d| {
            d.performance_analysis.summary.trim().is_empty()
                || d.budget_optimization.action.trim().is_empty()
        }) {
            return Err("decision summary or action is empty".to_string());
        }
        Ok(())
    }
}

pub struct InsightsEngine;

impl AgentSpec for InsightsEngine {
    type Input = PerformanceAnalysis;
    type Output = StrategicDecisions;
    const NAME: &'static str = "Strategist";
    const ROLE: &'static str = "Chief Marketing Officer";

    fn action(&self, analysis: &PerformanceAnalysis) -> String {
        format!(
            "Synthesizing strategy from {} channel readings",
            analysis.total_platforms
        )
    }

    fn prompt(&self, analysis: &PerformanceAnalysis) -> String {
        let metrics = serde_json::to_string_pretty(analysis).unwrap_or_default();
        format!(
            "Based on this marketing performance analysis:\n\n\
             PERFORMANCE METRICS:\n{metrics}\n\n\
             Generate exactly TWO strategic decisions with specific, actionable recommendations:\n\n\
             1. COST REDUCTION: Identify the highest-cost, lowest-performing elements that should be optimized or paused\n\
             2. RESULTS OPTIMIZATION: Identify the best-performing elements that should be scaled up\n\n\
             For each decision, provide:\n\
             - Specific platform/audience segment to target\n\
             - Quantified impact (percentages, cost savings, revenue increase)\n\
             - Clear action steps\n\
             - Technical reasoning based on the data"
        )
    }

    fn fallback(&self, analysis: &PerformanceAnalysis) -> StrategicDecisions {
        let worst = analysis.worst_cpc_platform.as_deref().unwrap_or("Twitter");
        let best_for_cost = analysis
            .best_roi_platform
            .as_deref()
            .unwrap_or("Instagram Reels");
        let ctr_leader = analysis
            .highest_ctr_platform
            .as_deref()
            .unwrap_or("Instagram");
        let best = analysis.best_roi_platform.as_deref().unwrap_or("Facebook");

        let cost_reduction = StrategicDecision {
            decision_type: DecisionKind::CostReduction,
            performance_analysis: PerformanceSummary {
                summary: format!(
                    "Analysis shows {} has elevated CPC costs with ROI below 1.5x threshold. \
                     Current spend allocation shows {} underperforming segments draining ₹{:.0} weekly. \
                     Recommend immediate budget reallocation to higher-yield channels.",
                    worst,
                    analysis.underperforming.len(),
                    analysis.total_spend * 0.3
                ),
                winning_segment: best_for_cost.to_string(),
                sentiment_leader: ctr_leader.to_string(),
            },
            budget_optimization: BudgetAction {
                action: format!("Reduce {worst} spend by 35% and pause low-CTR segments"),
            },
        };

        let results_optimization = StrategicDecision {
            decision_type: DecisionKind::ResultsOptimization,
            performance_analysis: PerformanceSummary {
                summary: format!(
                    "{} demonstrates superior ROI performance with {} high-yield segments identified. \
                     Current liquidity constraints limit scaling potential. \
                     Increasing budget allocation by 40% could capture additional ₹{:.0} in revenue \
                     based on current conversion velocity.",
                    best,
                    analysis.high_performers.len(),
                    analysis.total_spend * 0.6
                ),
                winning_segment: format!("{best} Lookalike Audiences"),
                sentiment_leader: best.to_string(),
            },
            budget_optimization: BudgetAction {
                action: format!("Increase {best} budget by 40% and expand top-performing ad sets"),
            },
        };

        StrategicDecisions(vec![cost_reduction, results_optimization])
    }
}
