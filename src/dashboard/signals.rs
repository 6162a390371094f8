//! 单渠道横向比较：同一渠道上所有活动按 ROI 排名

use serde::Serialize;

use crate::campaign::CampaignId;
use crate::core::{HiveError, HiveResult};
use crate::dashboard::AggregationEngine;

/// 领先者 ROI 超过该值时给出预算转移建议
pub const SHIFT_ROI_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignRoi {
    pub id: CampaignId,
    pub name: String,
    pub roi: f64,
    pub conversions: u64,
    pub spend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSignals {
    pub channel: String,
    pub signals: Vec<String>,
    pub leader: Option<CampaignRoi>,
    pub laggard: Option<CampaignRoi>,
}

impl ChannelSignals {
    /// campaigns 需已按 ROI 降序排列
    pub fn from_ranked(channel: &str, campaigns: &[CampaignRoi]) -> Self {
        let mut signals = Vec::new();
        let (leader, laggard) = match campaigns {
            [] => {
                signals.push(format!(
                    "Void Signal: No active campaigns detected on {channel}. Initialization required."
                ));
                (None, None)
            }
            [only] => {
                signals.push(format!(
                    "Node Isolation: '{}' is the sole active vector on {channel}. Expansion recommended.",
                    only.name
                ));
                (Some(only.clone()), None)
            }
            [leader, .., laggard] => {
                signals.push(format!(
                    "Strong Signal: '{}' is outperforming '{}' on {channel} by {:.1}x ROI.",
                    leader.name,
                    laggard.name,
                    leader.roi - laggard.roi
                ));
                if leader.roi > SHIFT_ROI_THRESHOLD {
                    signals.push(format!(
                        "Recommendation: Shift budget from '{}' to '{}' to maximize {channel} yield.",
                        laggard.name, leader.name
                    ));
                }
                (Some(leader.clone()), Some(laggard.clone()))
            }
        };

        Self {
            channel: channel.to_string(),
            signals,
            leader,
            laggard,
        }
    }

    /// 第一条信号作为摘要
    pub fn headline(&self) -> &str {
        self.signals
            .first()
            .map(String::as_str)
            .unwrap_or("No active signal detected.")
    }
}

impl AggregationEngine {
    /// 直接读取渠道注册表（不经过活动存储），孤儿活动也参与比较
    pub async fn channel_signals(&self, channel: &str) -> HiveResult<ChannelSignals> {
        let channel = channel.trim();
        if channel.is_empty() {
            return Err(HiveError::Validation("channel name is empty".to_string()));
        }

        let mut ranked = Vec::new();
        for id in self.registry.list_campaign_ids(channel).await {
            let record = self
                .registry
                .get_metrics(channel, &id)
                .await
                .unwrap_or_default();
            let name = self
                .registry
                .campaign_name(channel, &id)
                .await
                .unwrap_or_else(|| id.clone());
            ranked.push(CampaignRoi {
                name,
                roi: record.roi,
                conversions: record.conversions,
                spend: record.cost,
                id,
            });
        }
        // ROI 降序，同 ROI 按 id 升序
        ranked.sort_by(|a, b| b.roi.total_cmp(&a.roi).then_with(|| a.id.cmp(&b.id)));

        Ok(ChannelSignals::from_ranked(channel, &ranked))
    }
}
