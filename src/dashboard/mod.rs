//! 跨渠道指标聚合
//!
//! 指标分散在互相独立的渠道注册表中，活动记录在存储里；两边可能不一致：
//! - 孤儿：只在注册表里，仍计入全局汇总
//! - 未注册：只在存储里，以零值出现在摘要中
//!
//! 所有折叠都按渠道名、活动 ID 的排序顺序进行（BTreeMap / BTreeSet），
//! 同一快照重复计算得到逐位相同的 f64 结果，与注册表的遍历顺序无关。

pub mod insights;
pub mod nexus;
pub mod signals;
pub mod stats;
pub mod trend;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use insights::StrategicInsight;
pub use nexus::NexusInsight;
pub use signals::{CampaignRoi, ChannelSignals};
pub use stats::{round2, sort_summaries, CampaignSummary, ChannelStats, DashboardStats, Totals};
pub use trend::{PerformancePoint, TrendMetric, TrendPoint, MAX_TREND_DAYS};

use crate::agents::AgentSuite;
use crate::campaign::{CampaignId, CampaignStatus, StatsScope};
use crate::config::DashboardSection;
use crate::core::{HiveError, HiveResult, RandomSource};
use crate::registry::{ChannelMetricRecord, ChannelRegistry};
use crate::store::CampaignStore;

/// 单个活动的跨渠道累加
#[derive(Debug, Default)]
struct CampaignAccumulator {
    name: Option<String>,
    totals: Totals,
    channels: BTreeSet<String>,
    status: Option<CampaignStatus>,
    created_at: Option<DateTime<Utc>>,
}

impl CampaignAccumulator {
    fn into_summary(self, id: CampaignId) -> CampaignSummary {
        CampaignSummary {
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            status: self.status,
            spend: self.totals.cost,
            revenue: self.totals.revenue,
            roi: self.totals.roi(),
            channels: self.channels.into_iter().collect(),
            created_at: self.created_at,
            id,
        }
    }
}

pub struct AggregationEngine {
    registry: Arc<dyn ChannelRegistry>,
    store: Arc<dyn CampaignStore>,
    agents: Arc<AgentSuite>,
    rng: Arc<dyn RandomSource>,
    settings: DashboardSection,
}

impl AggregationEngine {
    pub fn new(
        registry: Arc<dyn ChannelRegistry>,
        store: Arc<dyn CampaignStore>,
        agents: Arc<AgentSuite>,
        rng: Arc<dyn RandomSource>,
        settings: DashboardSection,
    ) -> Self {
        Self {
            registry,
            store,
            agents,
            rng,
            settings,
        }
    }

    pub fn settings(&self) -> &DashboardSection {
        &self.settings
    }

    /// 排序去重后的渠道列表
    async fn sorted_channels(&self) -> BTreeSet<String> {
        self.registry.channels().await.into_iter().collect()
    }

    pub async fn compute_stats(&self, scope: &StatsScope) -> HiveResult<DashboardStats> {
        match scope {
            StatsScope::Campaign(id) => self.campaign_stats(id).await,
            StatsScope::All => Ok(self.global_stats().await),
        }
    }

    async fn campaign_stats(&self, id: &str) -> HiveResult<DashboardStats> {
        let records = self.registry.records_for(id).await;
        let stored = self.store.get(id).await;
        if records.is_empty() && stored.is_none() {
            return Err(HiveError::campaign_not_found(id));
        }

        let mut acc = CampaignAccumulator::default();
        let mut channels = Vec::with_capacity(records.len());
        for (channel, record) in &records {
            acc.totals.add(record);
            acc.channels.insert(channel.clone());
            let mut one = Totals::default();
            one.add(record);
            channels.push(ChannelStats::from_totals(channel.clone(), &one, 1));
        }

        match stored {
            Some(campaign) => {
                acc.name = Some(campaign.name);
                acc.status = Some(campaign.status);
                acc.created_at = Some(campaign.created_at);
            }
            None => {
                for (channel, _) in &records {
                    if let Some(name) = self.registry.campaign_name(channel, id).await {
                        acc.name = Some(name);
                        break;
                    }
                }
            }
        }

        let totals = acc.totals;
        let summary = acc.into_summary(id.to_string());
        Ok(DashboardStats::from_parts(
            StatsScope::Campaign(id.to_string()),
            1,
            &totals,
            channels,
            vec![summary],
        ))
    }

    async fn global_stats(&self) -> DashboardStats {
        let mut global = Totals::default();
        let mut per_campaign: BTreeMap<CampaignId, CampaignAccumulator> = BTreeMap::new();
        let mut channel_stats = Vec::new();

        for channel in self.sorted_channels().await {
            let ids = self.registry.list_campaign_ids(&channel).await;
            if ids.is_empty() {
                continue;
            }
            let mut channel_totals = Totals::default();
            for id in &ids {
                let record = self
                    .registry
                    .get_metrics(&channel, id)
                    .await
                    .unwrap_or_default();
                global.add(&record);
                channel_totals.add(&record);

                let acc = per_campaign.entry(id.clone()).or_default();
                acc.totals.add(&record);
                acc.channels.insert(channel.clone());
                if acc.name.is_none() {
                    acc.name = self.registry.campaign_name(&channel, id).await;
                }
            }
            channel_stats.push(ChannelStats::from_totals(channel, &channel_totals, ids.len()));
        }

        // 存储中的活动：补充名称、状态、创建时间；未登记到任何渠道的以零值加入
        for campaign in self.store.list().await {
            let acc = per_campaign.entry(campaign.id.clone()).or_default();
            acc.name = Some(campaign.name);
            acc.status = Some(campaign.status);
            acc.created_at = Some(campaign.created_at);
        }

        let total_campaigns = per_campaign.len();
        let mut summary: Vec<CampaignSummary> = per_campaign
            .into_iter()
            .map(|(id, acc)| acc.into_summary(id))
            .collect();
        sort_summaries(&mut summary);
        summary.truncate(self.settings.summary_limit);

        DashboardStats::from_parts(StatsScope::All, total_campaigns, &global, channel_stats, summary)
    }

    /// 范围内每个渠道的记录（单活动：该活动的各渠道记录；全局：按渠道合并）
    async fn channel_totals(&self, scope: &StatsScope) -> Vec<(String, Totals)> {
        match scope {
            StatsScope::Campaign(id) => self
                .registry
                .records_for(id)
                .await
                .into_iter()
                .map(|(channel, record)| {
                    let mut t = Totals::default();
                    t.add(&record);
                    (channel, t)
                })
                .collect(),
            StatsScope::All => {
                let mut out = Vec::new();
                for channel in self.sorted_channels().await {
                    let ids = self.registry.list_campaign_ids(&channel).await;
                    if ids.is_empty() {
                        continue;
                    }
                    let mut t = Totals::default();
                    for id in &ids {
                        let record: ChannelMetricRecord = self
                            .registry
                            .get_metrics(&channel, id)
                            .await
                            .unwrap_or_default();
                        t.add(&record);
                    }
                    out.push((channel, t));
                }
                out
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::agents::ActivityLog;
    use crate::core::FixedRandom;
    use crate::llm::{MockReasoningClient, ReasoningClient};
    use crate::registry::InMemoryChannelRegistry;
    use crate::store::InMemoryCampaignStore;

    pub struct Fixture {
        pub engine: AggregationEngine,
        pub registry: Arc<InMemoryChannelRegistry>,
        pub store: Arc<InMemoryCampaignStore>,
        pub mock: Arc<MockReasoningClient>,
    }

    pub fn fixture_with(channels: &[&str], noise: f64) -> Fixture {
        let mock = Arc::new(MockReasoningClient::failing());
        let client: Arc<dyn ReasoningClient> = mock.clone();
        let rng: Arc<dyn RandomSource> = Arc::new(FixedRandom(noise));
        let registry = Arc::new(InMemoryChannelRegistry::with_channels(
            channels.iter().copied(),
            rng.clone(),
        ));
        let store = Arc::new(InMemoryCampaignStore::new());
        let agents = Arc::new(AgentSuite::new(client, ActivityLog::new()));
        let engine = AggregationEngine::new(
            registry.clone(),
            store.clone(),
            agents,
            rng,
            DashboardSection::default(),
        );
        Fixture {
            engine,
            registry,
            store,
            mock,
        }
    }

    pub fn fixture() -> Fixture {
        fixture_with(&["Email", "Facebook", "Instagram"], 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::campaign::Campaign;
    use crate::core::SeededRandom;
    use crate::registry::InMemoryChannelRegistry;
    use chrono::TimeZone;

    fn record(cost: f64, roi: f64) -> ChannelMetricRecord {
        ChannelMetricRecord::with_counts(1000, 50, 5, cost, roi)
    }

    #[tokio::test]
    async fn test_single_scope_two_records() {
        let f = fixture();
        f.registry.insert_record("Email", "c1", "Duo", record(100.0, 2.0)).await;
        f.registry.insert_record("Instagram", "c1", "Duo", record(300.0, 1.0)).await;

        let stats = f
            .engine
            .compute_stats(&StatsScope::Campaign("c1".into()))
            .await
            .unwrap();
        assert_eq!(stats.total_spend, 400.0);
        assert_eq!(stats.total_revenue, 500.0);
        assert_eq!(stats.avg_roi, 1.25);
        assert_eq!(stats.total_campaigns, 1);
        assert_eq!(stats.channels.len(), 2);
        assert_eq!(stats.campaign_summary[0].name, "Duo");
        assert_eq!(stats.campaign_summary[0].status, None);
        assert_eq!(stats.avg_ctr, 5.0);
    }

    #[tokio::test]
    async fn test_single_scope_unknown_is_not_found() {
        let f = fixture();
        let err = f
            .engine
            .compute_stats(&StatsScope::Campaign("ghost".into()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_single_scope_stored_without_records() {
        let f = fixture();
        f.store.save(Campaign::restored("s1", "Stored", vec![])).await;
        let stats = f
            .engine
            .compute_stats(&StatsScope::Campaign("s1".into()))
            .await
            .unwrap();
        assert_eq!(stats.total_spend, 0.0);
        assert_eq!(stats.avg_roi, 0.0);
        assert_eq!(stats.campaign_summary[0].status, Some(CampaignStatus::Active));
    }

    #[tokio::test]
    async fn test_global_includes_orphans_and_unregistered() {
        let f = fixture();
        // 只在注册表中
        f.registry.insert_record("Facebook", "orphan", "Ghost", record(250.0, 2.0)).await;
        // 存储与注册表都有
        let mut known = Campaign::restored("known", "Known", vec!["Email".into()]);
        known.created_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        f.store.save(known).await;
        f.registry.insert_record("Email", "known", "Known", record(100.0, 3.0)).await;
        // 只在存储中
        let mut lonely = Campaign::restored("lonely", "Lonely", vec![]);
        lonely.created_at = Utc.timestamp_opt(1_700_000_500, 0).unwrap();
        f.store.save(lonely).await;

        let stats = f.engine.compute_stats(&StatsScope::All).await.unwrap();
        assert_eq!(stats.total_spend, 350.0);
        assert_eq!(stats.total_revenue, 800.0);
        assert_eq!(stats.total_campaigns, 3);

        let ids: Vec<&str> = stats.campaign_summary.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["lonely", "known", "orphan"]);
        let orphan = &stats.campaign_summary[2];
        assert_eq!(orphan.name, "Ghost");
        assert_eq!(orphan.spend, 250.0);
        assert_eq!(orphan.revenue, 500.0);
        assert_eq!(orphan.channels, vec!["Facebook"]);
        assert_eq!(stats.campaign_summary[0].spend, 0.0);

        // 空渠道不出现在分渠道汇总中
        let names: Vec<&str> = stats.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Email", "Facebook"]);
    }

    #[tokio::test]
    async fn test_channel_breakdown_uses_revenue_over_spend() {
        let f = fixture();
        f.registry.insert_record("Instagram", "a", "A", record(100.0, 4.0)).await;
        f.registry.insert_record("Instagram", "b", "B", record(300.0, 1.0)).await;
        let stats = f.engine.compute_stats(&StatsScope::All).await.unwrap();
        let ig = &stats.channels[0];
        assert_eq!(ig.campaign_count, 2);
        assert_eq!(ig.spend, 400.0);
        assert_eq!(ig.revenue, 700.0);
        assert_eq!(ig.roi, 1.75);
    }

    #[tokio::test]
    async fn test_summary_capped() {
        let f = fixture();
        for i in 0..8 {
            f.registry
                .insert_record("Email", &format!("c{i}"), "n", record(10.0, 1.0))
                .await;
        }
        let stats = f.engine.compute_stats(&StatsScope::All).await.unwrap();
        assert_eq!(stats.total_campaigns, 8);
        assert_eq!(stats.campaign_summary.len(), 5);
    }

    #[tokio::test]
    async fn test_global_is_idempotent_and_order_independent() {
        let data: Vec<(&str, &str, f64, f64)> = vec![
            ("Twitter", "a", 123.45, 1.1),
            ("Email", "a", 0.1, 3.3),
            ("Instagram", "b", 987.65, 2.7),
            ("Email", "c", 0.2, 0.7),
            ("Twitter", "c", 55.5, 1.9),
            ("Instagram", "a", 0.3, 4.4),
        ];

        let forward = fixture_with(&["Email", "Instagram", "Twitter"], 0.5);
        for (channel, id, cost, roi) in &data {
            forward.registry.insert_record(channel, id, id, record(*cost, *roi)).await;
        }
        let reversed = InMemoryChannelRegistry::with_channels(
            ["Twitter", "Instagram", "Email"],
            Arc::new(SeededRandom::new(1)),
        );
        for (channel, id, cost, roi) in data.iter().rev() {
            reversed.insert_record(channel, id, id, record(*cost, *roi)).await;
        }
        let other = AggregationEngine::new(
            Arc::new(reversed),
            forward.store.clone(),
            Arc::new(AgentSuite::new(
                forward.mock.clone(),
                crate::agents::ActivityLog::new(),
            )),
            Arc::new(SeededRandom::new(2)),
            DashboardSection::default(),
        );

        let first = forward.engine.compute_stats(&StatsScope::All).await.unwrap();
        let second = forward.engine.compute_stats(&StatsScope::All).await.unwrap();
        let permuted = other.compute_stats(&StatsScope::All).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.total_spend.to_bits(), permuted.total_spend.to_bits());
        assert_eq!(first.total_revenue.to_bits(), permuted.total_revenue.to_bits());
        assert_eq!(first.avg_roi.to_bits(), permuted.avg_roi.to_bits());
        assert_eq!(first.channels, permuted.channels);
        assert_eq!(first.campaign_summary, permuted.campaign_summary);
    }

    #[tokio::test]
    async fn test_zero_count_record_never_faults() {
        let f = fixture();
        f.registry
            .insert_record("Email", "z", "Zero", ChannelMetricRecord::default())
            .await;
        let stats = f.engine.compute_stats(&StatsScope::All).await.unwrap();
        assert_eq!(stats.avg_ctr, 0.0);
        assert_eq!(stats.avg_cpc, 0.0);
        assert_eq!(stats.avg_cpm, 0.0);
        assert_eq!(stats.avg_conversion_rate, 0.0);
        assert_eq!(stats.avg_roi, 0.0);
        assert_eq!(stats.channels[0].ctr, 0.0);
        assert_eq!(stats.nexus_insight.health_score, 50);
    }
}
