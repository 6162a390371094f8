//! 战略洞察：把范围内的渠道表现交给 InsightsEngine，并把结果写入决策日志

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::agents::{ChannelPerformance, PerformanceAnalysis, StrategicDecision};
use crate::campaign::{AiDecision, NewDecision, StatsScope};
use crate::core::{HiveError, HiveResult};
use crate::dashboard::AggregationEngine;

/// 已落库的一条战略决策
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicInsight {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub source_fallback: bool,
    #[serde(flatten)]
    pub decision: StrategicDecision,
}

impl AggregationEngine {
    /// 范围内各渠道的表现快照（空渠道已排除）
    pub async fn performance_analysis(&self, scope: &StatsScope) -> PerformanceAnalysis {
        let channels = self
            .channel_totals(scope)
            .await
            .into_iter()
            .map(|(platform, totals)| ChannelPerformance {
                platform,
                cost: totals.cost,
                roi: totals.roi(),
                cpc: totals.cpc(),
                ctr: totals.ctr(),
                conversions: totals.conversions,
                revenue: totals.revenue,
            })
            .collect();
        PerformanceAnalysis::from_channels(channels)
    }

    /// 生成两条战略决策（成本削减、效果放大）并写入决策日志
    ///
    /// 范围内没有任何指标时直接返回空列表，不调用推理后端。
    pub async fn get_insights(&self, scope: &StatsScope) -> HiveResult<Vec<StrategicInsight>> {
        if let StatsScope::Campaign(id) = scope {
            if self.registry.records_for(id).await.is_empty() && self.store.get(id).await.is_none()
            {
                return Err(HiveError::campaign_not_found(id.as_str()));
            }
        }

        let analysis = self.performance_analysis(scope).await;
        if analysis.is_empty() {
            debug!("No channel data in scope; skipping strategy synthesis");
            return Ok(Vec::new());
        }

        let result = self.agents.insights.invoke(&analysis).await;
        let fallback = result.is_fallback();
        let decisions = result.into_inner().0;

        let mut out = Vec::with_capacity(decisions.len());
        for decision in decisions {
            let payload = serde_json::to_value(&decision).unwrap_or_default();
            let stored: AiDecision = self
                .store
                .append_decision(NewDecision::new(
                    scope.campaign_id().map(str::to_string),
                    decision.decision_type.as_str(),
                    payload,
                ))
                .await;
            out.push(StrategicInsight {
                seq: stored.seq,
                timestamp: stored.timestamp,
                source_fallback: fallback,
                decision,
            });
        }
        info!(
            "Recorded {} strategic decisions (fallback: {})",
            out.len(),
            fallback
        );
        Ok(out)
    }

    /// 最近的决策，最新在前，条数上限取自配置
    pub async fn recent_decisions(&self, scope: &StatsScope) -> Vec<AiDecision> {
        self.store
            .list_decisions(scope, self.settings.decision_limit)
            .await
    }

    /// 清空决策日志
    pub async fn purge_decisions(&self) -> usize {
        let purged = self.store.purge_decisions().await;
        info!("Purged {} decisions", purged);
        purged
    }
}
