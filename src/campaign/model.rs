//! 活动与决策的数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{BroadcastLog, ChannelRecommendation, ExecutionTimeline, RoiForecast, StrategyPlan};
use crate::campaign::lifecycle::CampaignStatus;
use crate::core::{HiveError, HiveResult};

/// 活动 ID（UUID v4 字符串，创建后不可变）
pub type CampaignId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub budget: f64,
    pub spent: f64,
    pub objective: String,
    /// 有序且去重
    pub channels: Vec<String>,
    pub strategy: StrategyPlan,
    pub recommendation: ChannelRecommendation,
    pub roi_forecast: RoiForecast,
    pub timeline: ExecutionTimeline,
    pub broadcast_log: BroadcastLog,
    pub created_at: DateTime<Utc>,
}

/// 孤儿活动恢复时的默认预算
pub const RESTORED_BUDGET: f64 = 50_000.0;
pub const RESTORED_OBJECTIVE: &str = "Sales";

impl Campaign {
    /// 只在渠道注册表中出现的活动，补建为 Active 记录
    pub fn restored(id: impl Into<CampaignId>, name: impl Into<String>, channels: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: CampaignStatus::Active,
            budget: RESTORED_BUDGET,
            spent: 0.0,
            objective: RESTORED_OBJECTIVE.to_string(),
            strategy: StrategyPlan::restored(),
            recommendation: ChannelRecommendation::restored(&channels),
            roi_forecast: RoiForecast::restored(),
            timeline: ExecutionTimeline::restored(30),
            broadcast_log: BroadcastLog::restored(&channels),
            channels,
            created_at: Utc::now(),
        }
    }
}

/// 创建活动的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSpec {
    pub name: String,
    pub objective: String,
    pub budget: f64,
    pub channels: Vec<String>,
}

impl CampaignSpec {
    pub fn new(
        name: impl Into<String>,
        objective: impl Into<String>,
        budget: f64,
        channels: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            objective: objective.into(),
            budget,
            channels: channels.into_iter().map(Into::into).collect(),
        }
    }

    /// 预算以文本形式传入（如表单字段），非数字视为校验失败
    pub fn parse(
        name: impl Into<String>,
        objective: impl Into<String>,
        budget: &str,
        channels: impl IntoIterator<Item = impl Into<String>>,
    ) -> HiveResult<Self> {
        let budget = parse_amount("budget", budget)?;
        let spec = Self::new(name, objective, budget, channels);
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> HiveResult<()> {
        if self.name.trim().is_empty() {
            return Err(HiveError::Validation("campaign name must not be empty".into()));
        }
        if self.objective.trim().is_empty() {
            return Err(HiveError::Validation("objective must not be empty".into()));
        }
        check_amount("budget", self.budget)?;
        if normalize_channels(&self.channels).is_empty() {
            return Err(HiveError::Validation("at least one channel is required".into()));
        }
        Ok(())
    }

    /// 去空白、去重后的渠道列表（保持首次出现的顺序）
    pub fn normalized_channels(&self) -> Vec<String> {
        normalize_channels(&self.channels)
    }
}

pub fn normalize_channels(channels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(channels.len());
    for c in channels {
        let c = c.trim();
        if !c.is_empty() && !out.iter().any(|existing| existing == c) {
            out.push(c.to_string());
        }
    }
    out
}

fn parse_amount(field: &str, raw: &str) -> HiveResult<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| HiveError::Validation(format!("{field} must be numeric, got '{raw}'")))?;
    check_amount(field, value)?;
    Ok(value)
}

fn check_amount(field: &str, value: f64) -> HiveResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(HiveError::Validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// 部分字段更新；None 表示不修改
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignUpdate {
    pub name: Option<String>,
    pub budget: Option<f64>,
    pub spent: Option<f64>,
    pub objective: Option<String>,
    pub channels: Option<Vec<String>>,
}

impl CampaignUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.budget.is_none()
            && self.spent.is_none()
            && self.objective.is_none()
            && self.channels.is_none()
    }

    pub fn validate(&self) -> HiveResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(HiveError::Validation("campaign name must not be empty".into()));
            }
        }
        if let Some(budget) = self.budget {
            check_amount("budget", budget)?;
        }
        if let Some(spent) = self.spent {
            check_amount("spent", spent)?;
        }
        Ok(())
    }

    pub fn apply(&self, campaign: &mut Campaign) {
        if let Some(name) = &self.name {
            campaign.name = name.trim().to_string();
        }
        if let Some(budget) = self.budget {
            campaign.budget = budget;
        }
        if let Some(spent) = self.spent {
            campaign.spent = spent;
        }
        if let Some(objective) = &self.objective {
            campaign.objective = objective.clone();
        }
        if let Some(channels) = &self.channels {
            campaign.channels = normalize_channels(channels);
        }
    }
}

/// 聚合与决策日志的范围
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatsScope {
    Campaign(CampaignId),
    All,
}

impl StatsScope {
    /// None、空串或 "all"（不区分大小写）表示全局
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Self::All,
            Some(id) => Self::Campaign(id.to_string()),
        }
    }

    pub fn campaign_id(&self) -> Option<&str> {
        match self {
            Self::Campaign(id) => Some(id),
            Self::All => None,
        }
    }
}

/// 决策日志中的一条（只追加，仅支持整体清空）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDecision {
    pub seq: u64,
    pub campaign_id: Option<CampaignId>,
    pub decision_type: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// 待写入的决策；seq 与时间戳由存储层分配
#[derive(Debug, Clone, PartialEq)]
pub struct NewDecision {
    pub campaign_id: Option<CampaignId>,
    pub decision_type: String,
    pub payload: serde_json::Value,
}

impl NewDecision {
    pub fn new(
        campaign_id: Option<CampaignId>,
        decision_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            campaign_id,
            decision_type: decision_type.into(),
            payload,
        }
    }
}
