//! 活动编排：组合多个 Agent 生成活动方案，驱动生命周期
//!
//! - `initialize_campaign`：并发调用 Planner / Recommender / ROI / Timeline / ExecutionLead，按固定字段顺序组装；
//!   在每个渠道登记，Email 缺席时按概率主动扩展
//! - `evaluate_transition`：规则表给建议，LifecycleManager 裁决，每次都写一条 StatusUpdate 决策
//! - 其余为存储与注册表之间的协调（孤儿恢复、级联删除、列表时的预测汇总）

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::agents::lifecycle::{LifecycleDecision, LifecycleManager, LifecycleRequest};
use crate::agents::roi::parse_percent;
use crate::agents::{
    AgentResult, AgentSpec, AgentSuite, AudienceSegment, BrandSignal, BudgetBrief,
    BudgetReallocation, ConsistencyAudit, CreativeBrief, CreativeSuggestion, PlanningBrief,
};
use crate::campaign::lifecycle::{advise, CampaignStatus, TargetStatus};
use crate::campaign::model::{Campaign, CampaignId, CampaignSpec, CampaignUpdate, NewDecision};
use crate::config::OrchestratorSection;
use crate::core::{HiveError, HiveResult, RandomSource};
use crate::registry::{ChannelMetricRecord, ChannelRegistry};
use crate::store::{CampaignStore, StatusWrite};

pub const STATUS_UPDATE: &str = "StatusUpdate";

/// 生命周期裁决来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionSource {
    /// 后端给出的结果
    Agent,
    /// 后端失败，使用兜底
    Fallback,
    /// 已终止，未调用 Agent
    TerminalState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub campaign_id: CampaignId,
    pub action: String,
    pub previous_status: CampaignStatus,
    pub new_status: CampaignStatus,
    pub advised_status: Option<CampaignStatus>,
    pub confirmation_message: String,
    pub reasoning: String,
    pub source: DecisionSource,
    /// 对应 StatusUpdate 决策的序号
    pub decision_seq: u64,
}

pub struct CampaignOrchestrator {
    agents: Arc<AgentSuite>,
    registry: Arc<dyn ChannelRegistry>,
    store: Arc<dyn CampaignStore>,
    rng: Arc<dyn RandomSource>,
    settings: OrchestratorSection,
}

impl CampaignOrchestrator {
    pub fn new(
        agents: Arc<AgentSuite>,
        registry: Arc<dyn ChannelRegistry>,
        store: Arc<dyn CampaignStore>,
        rng: Arc<dyn RandomSource>,
        settings: OrchestratorSection,
    ) -> Self {
        Self {
            agents,
            registry,
            store,
            rng,
            settings,
        }
    }

    fn log_activity(&self, action: impl Into<String>) {
        self.agents
            .activity()
            .record(LifecycleManager::NAME, LifecycleManager::ROLE, action);
    }

    /// 生成完整活动方案（Draft），登记到渠道；不写入存储
    pub async fn initialize_campaign(&self, spec: &CampaignSpec) -> HiveResult<Campaign> {
        spec.validate()?;
        let mut channels = spec.normalized_channels();
        self.log_activity(format!("Initializing new campaign sequence: {}", spec.name));

        let brief = PlanningBrief {
            objective: spec.objective.clone(),
            budget: spec.budget,
        };
        let start = Utc::now().date_naive();
        let (strategy, recommendation, roi_forecast, timeline, broadcast_log) = tokio::join!(
            self.agents.planner.invoke(&brief),
            self.agents.recommender.invoke(&spec.objective),
            self.agents.roi.invoke(&spec.budget),
            self.agents.timeline.invoke(&start),
            self.agents.execution.invoke(&channels),
        );

        let id = Uuid::new_v4().to_string();
        for channel in &channels {
            self.registry
                .register(channel, &id, &spec.name, spec.budget, &spec.objective)
                .await;
        }

        let expansion = self.settings.expansion_channel.as_str();
        if !channels.iter().any(|c| c == expansion) {
            let roll = self.rng.next_f64();
            if roll < self.settings.email_expansion_probability {
                self.log_activity(format!(
                    "Expanding '{}' to {} for holistic coverage",
                    spec.name, expansion
                ));
                tracing::info!(campaign_id = %id, roll, channel = expansion, "proactive channel expansion");
                channels.push(expansion.to_string());
                self.registry
                    .register(expansion, &id, &spec.name, spec.budget, &spec.objective)
                    .await;
            }
        }

        let campaign = Campaign {
            id,
            name: spec.name.trim().to_string(),
            status: CampaignStatus::Draft,
            budget: spec.budget,
            spent: 0.0,
            objective: spec.objective.clone(),
            channels,
            strategy: strategy.into_inner(),
            recommendation: recommendation.into_inner(),
            roi_forecast: roi_forecast.into_inner(),
            timeline: timeline.into_inner(),
            broadcast_log: broadcast_log.into_inner(),
            created_at: Utc::now(),
        };
        tracing::info!(campaign_id = %campaign.id, channels = ?campaign.channels, "campaign initialized");
        Ok(campaign)
    }

    /// initialize_campaign + 持久化
    pub async fn create_campaign(&self, spec: &CampaignSpec) -> HiveResult<Campaign> {
        let campaign = self.initialize_campaign(spec).await?;
        self.store.save(campaign.clone()).await;
        Ok(campaign)
    }

    /// 裁决一次生命周期动作并记录决策；不修改存储中的状态
    pub async fn evaluate_transition(
        &self,
        campaign: &Campaign,
        action: &str,
    ) -> HiveResult<TransitionOutcome> {
        let action = action.trim();
        if action.is_empty() {
            return Err(HiveError::Validation("action must not be empty".into()));
        }

        let current = campaign.status;
        let advised = advise(current, action);

        let (decision, source) = if current.is_terminal() {
            let decision = LifecycleDecision {
                new_status: TargetStatus::Terminated,
                confirmation_message: format!(
                    "Campaign {} is terminated; '{}' was not applied.",
                    campaign.name, action
                ),
                reasoning: "Terminated is a terminal state with no outgoing transitions.".to_string(),
            };
            (decision, DecisionSource::TerminalState)
        } else {
            let request = LifecycleRequest {
                campaign_name: campaign.name.clone(),
                current,
                action: action.to_string(),
                advised,
            };
            match self.agents.lifecycle.invoke(&request).await {
                AgentResult::Generated(d) => (d, DecisionSource::Agent),
                AgentResult::Fallback(d) => (d, DecisionSource::Fallback),
            }
        };

        let new_status = CampaignStatus::from(decision.new_status);
        let payload = json!({
            "action": action,
            "previous_status": current,
            "new_status": new_status,
            "advised_status": advised,
            "confirmation_message": decision.confirmation_message,
            "reasoning": decision.reasoning,
            "source": source,
        });
        let logged = self
            .store
            .append_decision(NewDecision::new(
                Some(campaign.id.clone()),
                STATUS_UPDATE,
                payload,
            ))
            .await;

        tracing::info!(
            campaign_id = %campaign.id,
            action,
            from = %current,
            to = %new_status,
            source = ?source,
            "lifecycle transition evaluated"
        );

        Ok(TransitionOutcome {
            campaign_id: campaign.id.clone(),
            action: action.to_string(),
            previous_status: current,
            new_status,
            advised_status: advised,
            confirmation_message: decision.confirmation_message,
            reasoning: decision.reasoning,
            source,
            decision_seq: logged.seq,
        })
    }

    /// 查找、裁决并写回新状态
    ///
    /// 写回以读取时的状态为前提；裁决期间状态已被改动（例如被并发终止）时返回 Conflict，不覆盖。
    pub async fn transition_campaign(&self, id: &str, action: &str) -> HiveResult<TransitionOutcome> {
        let campaign = self.get_campaign(id).await?;
        let outcome = self.evaluate_transition(&campaign, action).await?;
        if outcome.new_status == campaign.status {
            return Ok(outcome);
        }
        match self
            .store
            .update_status_if(id, campaign.status, outcome.new_status)
            .await
        {
            StatusWrite::Applied => Ok(outcome),
            StatusWrite::Conflict(actual) => {
                tracing::warn!(
                    campaign_id = id,
                    expected = %campaign.status,
                    actual = %actual,
                    "status changed during transition; discarding {}",
                    outcome.new_status
                );
                Err(HiveError::status_conflict(id, campaign.status, actual))
            }
            StatusWrite::Missing => Err(HiveError::campaign_not_found(id)),
        }
    }

    pub async fn get_campaign(&self, id: &str) -> HiveResult<Campaign> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| HiveError::campaign_not_found(id))
    }

    pub async fn update_campaign(&self, id: &str, update: &CampaignUpdate) -> HiveResult<Campaign> {
        update.validate()?;
        if !self.store.update(id, update).await {
            return Err(HiveError::campaign_not_found(id));
        }
        self.get_campaign(id).await
    }

    /// 从所有渠道注册表中移除，再删除存储记录；返回存储中是否存在过
    pub async fn delete_campaign(&self, id: &str) -> bool {
        let mut removed_from = Vec::new();
        for channel in self.registry.channels().await {
            if self.registry.remove(&channel, id).await {
                removed_from.push(channel);
            }
        }
        let existed = self.store.delete(id).await;
        tracing::info!(campaign_id = id, channels = ?removed_from, existed, "campaign deleted");
        existed
    }

    /// 把只存在于注册表中的活动补建到存储，返回补建的 ID（升序）
    pub async fn adopt_orphans(&self) -> Vec<CampaignId> {
        let index = self.registry.campaign_index().await;
        let mut adopted = Vec::new();
        for (id, channels) in index {
            if self.store.get(&id).await.is_some() {
                continue;
            }
            let mut name = None;
            for channel in &channels {
                if let Some(n) = self.registry.campaign_name(channel, &id).await {
                    name = Some(n);
                    break;
                }
            }
            let name = name.unwrap_or_else(|| "Unknown".to_string());
            // 查找渠道名期间可能已由 create_campaign 落库
            let restored = Campaign::restored(id.clone(), name.clone(), channels.into_iter().collect());
            if self.store.save_if_absent(restored).await {
                tracing::warn!(campaign_id = %id, name = %name, "restored orphaned campaign from channel registries");
                adopted.push(id);
            }
        }
        adopted
    }

    /// 先恢复孤儿，再按创建时间倒序列出，并用渠道预测数据补充 ROI 预测与排期
    pub async fn list_campaigns(&self) -> Vec<Campaign> {
        self.adopt_orphans().await;
        let mut campaigns = self.store.list().await;
        for campaign in &mut campaigns {
            let records = self.registry.records_for(&campaign.id).await;
            enrich_with_forecasts(campaign, &records);
        }
        campaigns
    }

    /// 用各渠道的情绪与互动深度做品牌一致性审计
    pub async fn audit_consistency(&self, id: &str) -> HiveResult<AgentResult<ConsistencyAudit>> {
        let records = self.registry.records_for(id).await;
        if records.is_empty() && self.store.get(id).await.is_none() {
            return Err(HiveError::campaign_not_found(id));
        }
        let signals: Vec<BrandSignal> = records
            .into_iter()
            .map(|(channel, r)| BrandSignal {
                channel,
                sentiment_score: r.sentiment_score,
                engagement_depth: r.audience_insight.engagement_depth,
            })
            .collect();
        Ok(self.agents.consistency.invoke(&signals).await)
    }

    pub async fn audience_insight(&self, channel: &str) -> HiveResult<AgentResult<AudienceSegment>> {
        let channel = require_channel(channel)?;
        Ok(self.agents.audience.invoke(&channel).await)
    }

    pub async fn optimize_creative(
        &self,
        channel: &str,
        performance: &str,
    ) -> HiveResult<AgentResult<CreativeSuggestion>> {
        let brief = CreativeBrief {
            channel: require_channel(channel)?,
            performance: performance.to_string(),
        };
        Ok(self.agents.creative.invoke(&brief).await)
    }

    pub async fn optimize_budget(
        &self,
        budget: f64,
        breakdown: BTreeMap<String, f64>,
    ) -> HiveResult<AgentResult<BudgetReallocation>> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(HiveError::Validation(format!(
                "budget must be a non-negative number, got {budget}"
            )));
        }
        let brief = BudgetBrief {
            current_budget: budget,
            breakdown,
        };
        Ok(self.agents.budget.invoke(&brief).await)
    }
}

fn require_channel(channel: &str) -> HiveResult<String> {
    let channel = channel.trim();
    if channel.is_empty() {
        return Err(HiveError::Validation("channel must not be empty".into()));
    }
    Ok(channel.to_string())
}

/// 渠道预测汇总：ROI 取平均（1 位小数），转化数求和，置信度取平均；排期取最长天数
fn enrich_with_forecasts(campaign: &mut Campaign, records: &[(String, ChannelMetricRecord)]) {
    let forecasts: Vec<(&ChannelMetricRecord, u8)> = records
        .iter()
        .filter_map(|(_, r)| parse_percent(&r.forecast.confidence_score).map(|c| (r, c)))
        .collect();

    if !forecasts.is_empty() {
        let n = forecasts.len() as f64;
        let roi_sum: f64 = forecasts.iter().map(|(r, _)| r.forecast.projected_roi).sum();
        let conversions: u64 = forecasts
            .iter()
            .map(|(r, _)| r.forecast.projected_conversions)
            .sum();
        let confidence_sum: f64 = forecasts.iter().map(|(_, c)| f64::from(*c)).sum();

        campaign.roi_forecast.projected_roi = (roi_sum / n * 10.0).round() / 10.0;
        campaign.roi_forecast.projected_conversions = conversions;
        campaign.roi_forecast.confidence_score = format!("{}%", (confidence_sum / n).round());
    }

    let duration = records
        .iter()
        .map(|(_, r)| r.schedule.duration_days)
        .max()
        .unwrap_or(0);
    if duration > 0 {
        campaign.timeline.duration_days = duration;
    }
}
