//! 渠道注册表：每个渠道各自维护一份「活动 -> 指标」记录
//!
//! 注册表之间互相独立、异步更新，与活动存储（store）是两套读模型；
//! 一个活动可能只出现在注册表里（孤儿），也可能只在存储里（未注册）。

pub mod memory;
pub mod metrics;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

pub use memory::InMemoryChannelRegistry;
pub use metrics::{safe_div, AudienceInsight, ChannelMetricRecord, ForecastData, ScheduleData};

use crate::campaign::model::CampaignId;

/// 渠道注册表边界（文件、远端 API 等实现都挂在这个 trait 后面）
#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    /// 已知渠道
    async fn channels(&self) -> Vec<String>;

    /// 某渠道上登记的全部活动 ID
    async fn list_campaign_ids(&self, channel: &str) -> BTreeSet<CampaignId>;

    /// 某活动在某渠道上的指标；不存在时返回 None，调用方用 `unwrap_or_default()` 得到零记录
    async fn get_metrics(&self, channel: &str, campaign_id: &str) -> Option<ChannelMetricRecord>;

    /// 登记时记录的活动名
    async fn campaign_name(&self, channel: &str, campaign_id: &str) -> Option<String>;

    /// 在渠道上登记活动；渠道不存在时先创建
    async fn register(
        &self,
        channel: &str,
        campaign_id: &str,
        name: &str,
        budget: f64,
        objective: &str,
    );

    /// 从渠道移除活动，返回是否存在过
    async fn remove(&self, channel: &str, campaign_id: &str) -> bool;

    /// 活动在所有渠道上的记录，按渠道名排序
    async fn records_for(&self, campaign_id: &str) -> Vec<(String, ChannelMetricRecord)> {
        let mut channels = self.channels().await;
        channels.sort();
        channels.dedup();

        let mut out = Vec::new();
        for channel in channels {
            if self.list_campaign_ids(&channel).await.contains(campaign_id) {
                let record = self
                    .get_metrics(&channel, campaign_id)
                    .await
                    .unwrap_or_default();
                out.push((channel, record));
            }
        }
        out
    }

    /// 所有注册表里出现过的活动 -> 所在渠道集合
    async fn campaign_index(&self) -> BTreeMap<CampaignId, BTreeSet<String>> {
        let mut index: BTreeMap<CampaignId, BTreeSet<String>> = BTreeMap::new();
        for channel in self.channels().await {
            for id in self.list_campaign_ids(&channel).await {
                index.entry(id).or_default().insert(channel.clone());
            }
        }
        index
    }
}
