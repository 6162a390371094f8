//! 专用推理 Agent
//!
//! 每个 Agent 是一个 `SchemaAgent<S>`：S 实现 AgentSpec，提供 prompt、输出结构与兜底。
//! `AgentSuite` 用同一个推理后端与活动日志一次性构造全部 Agent，供编排层与聚合层共享。

pub mod activity;
pub mod audience;
pub mod base;
pub mod budget;
pub mod consistency;
pub mod creative;
pub mod execution;
pub mod insights;
pub mod lifecycle;
pub mod planner;
pub mod recommender;
pub mod roi;
pub mod timeline;

use std::sync::Arc;

pub use activity::{ActivityEntry, ActivityLog};
pub use audience::{AudienceProfiler, AudienceSegment};
pub use base::{parse_document, schema_hint, strip_code_fence, AgentResult, AgentSpec, SchemaAgent, Validate};
pub use budget::{BudgetBrief, BudgetOptimizer, BudgetReallocation};
pub use consistency::{AuditStatus, BrandAuditor, BrandSignal, ConsistencyAudit};
pub use creative::{CreativeBrief, CreativeOptimizer, CreativeSuggestion};
pub use execution::{BroadcastLog, ExecutionLead};
pub use insights::{
    ChannelPerformance, DecisionKind, InsightsEngine, PerformanceAnalysis, StrategicDecision,
    StrategicDecisions,
};
pub use lifecycle::{LifecycleDecision, LifecycleManager, LifecycleRequest};
pub use planner::{Planner, PlanningBrief, Priority, StrategyPlan};
pub use recommender::{ChannelRecommendation, Recommender};
pub use roi::{RoiAnalyst, RoiForecast};
pub use timeline::{ExecutionTimeline, Milestone, TimelineManager};

use crate::llm::ReasoningClient;

/// 后端不可用时多个 Agent 共用的模拟信号
pub const SIMULATED_SIGNAL: &str = "AI Signal: Synchronization complete (Simulated Confirmation).";

/// 全部 Agent，共享一个推理后端与一份活动日志
pub struct AgentSuite {
    pub planner: SchemaAgent<Planner>,
    pub recommender: SchemaAgent<Recommender>,
    pub roi: SchemaAgent<RoiAnalyst>,
    pub timeline: SchemaAgent<TimelineManager>,
    pub consistency: SchemaAgent<BrandAuditor>,
    pub creative: SchemaAgent<CreativeOptimizer>,
    pub budget: SchemaAgent<BudgetOptimizer>,
    pub audience: SchemaAgent<AudienceProfiler>,
    pub execution: SchemaAgent<ExecutionLead>,
    pub insights: SchemaAgent<InsightsEngine>,
    pub lifecycle: SchemaAgent<LifecycleManager>,
    activity: ActivityLog,
}

impl AgentSuite {
    pub fn new(client: Arc<dyn ReasoningClient>, activity: ActivityLog) -> Self {
        Self {
            planner: SchemaAgent::new(Planner, client.clone(), activity.clone()),
            recommender: SchemaAgent::new(Recommender, client.clone(), activity.clone()),
            roi: SchemaAgent::new(RoiAnalyst, client.clone(), activity.clone()),
            timeline: SchemaAgent::new(TimelineManager, client.clone(), activity.clone()),
            consistency: SchemaAgent::new(BrandAuditor, client.clone(), activity.clone()),
            creative: SchemaAgent::new(CreativeOptimizer, client.clone(), activity.clone()),
            budget: SchemaAgent::new(BudgetOptimizer, client.clone(), activity.clone()),
            audience: SchemaAgent::new(AudienceProfiler, client.clone(), activity.clone()),
            execution: SchemaAgent::new(ExecutionLead, client.clone(), activity.clone()),
            insights: SchemaAgent::new(InsightsEngine, client.clone(), activity.clone()),
            lifecycle: SchemaAgent::new(LifecycleManager, client, activity.clone()),
            activity,
        }
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::lifecycle::{CampaignStatus, TargetStatus};
    use crate::llm::MockReasoningClient;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn failing_suite() -> (AgentSuite, Arc<MockReasoningClient>) {
        let mock = Arc::new(MockReasoningClient::failing());
        (AgentSuite::new(mock.clone(), ActivityLog::new()), mock)
    }

    /// 后端永远失败时，每个 Agent 都返回通过自身校验的兜底结果
    #[tokio::test]
    async fn test_every_agent_falls_back_to_valid_document() {
        let (suite, mock) = failing_suite();

        let plan = suite
            .planner
            .invoke(&PlanningBrief {
                objective: "Awareness".into(),
                budget: 1000.0,
            })
            .await;
        assert!(plan.is_fallback());
        assert!(plan.document().validate().is_ok());

        let rec = suite.recommender.invoke(&"Sales".to_string()).await;
        assert!(rec.is_fallback() && rec.document().validate().is_ok());

        let roi = suite.roi.invoke(&1000.0).await;
        assert_eq!(roi.document().confidence_score, "88%");

        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let tl = suite.timeline.invoke(&start).await;
        assert!(tl.document().validate().is_ok());

        let audit = suite.consistency.invoke(&Vec::new()).await;
        assert_eq!(audit.document().status, AuditStatus::Green);

        let creative = suite
            .creative
            .invoke(&CreativeBrief {
                channel: "Instagram".into(),
                performance: "CTR 1.2%".into(),
            })
            .await;
        assert_eq!(creative.document().action_type, "Creative Swap");

        let budget = suite
            .budget
            .invoke(&BudgetBrief {
                current_budget: 1000.0,
                breakdown: BTreeMap::new(),
            })
            .await;
        assert_eq!(budget.document().savings_projected, "120.00");

        let audience = suite.audience.invoke(&"Email".to_string()).await;
        assert_eq!(audience.document().match_rate, "High");

        let broadcast = suite.execution.invoke(&vec!["Email".to_string()]).await;
        assert_eq!(broadcast.document().confirmation_code, "TX-00000-SIM");

        let analysis = PerformanceAnalysis::from_channels(vec![ChannelPerformance {
            platform: "Email".into(),
            cost: 100.0,
            roi: 2.5,
            cpc: 1.0,
            ctr: 5.0,
            conversions: 4,
            revenue: 250.0,
        }]);
        let insights = suite.insights.invoke(&analysis).await;
        assert!(insights.document().validate().is_ok());

        let decision = suite
            .lifecycle
            .invoke(&LifecycleRequest {
                campaign_name: "c".into(),
                current: CampaignStatus::Paused,
                action: "Pause".into(),
                advised: None,
            })
            .await;
        assert_eq!(decision.document().new_status, TargetStatus::Active);

        assert_eq!(mock.call_count(), 11);
        // 每个 Agent 一条动作 + 一条兜底
        assert_eq!(suite.activity().len(), 22);
    }

    #[tokio::test]
    async fn test_generated_output_passes_through() {
        let mock = Arc::new(MockReasoningClient::with_responses([
            "```json\n{\"segment_name\":\"Night-shift gamers\",\"match_rate\":\"Medium\",\"expansion_opportunity\":\"Limited\"}\n```",
        ]));
        let suite = AgentSuite::new(mock, ActivityLog::new());
        let seg = suite.audience.invoke(&"Twitter".to_string()).await;
        assert!(!seg.is_fallback());
        assert_eq!(seg.into_inner().segment_name, "Night-shift gamers");
    }

    #[tokio::test]
    async fn test_broadcast_with_missing_channel_falls_back() {
        let mock = Arc::new(MockReasoningClient::with_responses([
            r#"{"broadcast_status":"Success","deployments":{"Email":"Live"},"confirmation_code":"TX-1","ai_signal":"ok"}"#,
        ]));
        let suite = AgentSuite::new(mock, ActivityLog::new());
        let channels = vec!["Email".to_string(), "Twitter".to_string()];
        let log = suite.execution.invoke(&channels).await;
        assert!(log.is_fallback());
        assert_eq!(log.document().deployments.len(), 2);
    }
}
