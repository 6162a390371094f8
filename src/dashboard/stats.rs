//! 聚合统计的数据结构与累加器

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::campaign::{CampaignId, CampaignStatus, StatsScope};
use crate::dashboard::nexus::NexusInsight;
use crate::registry::{safe_div, ChannelMetricRecord};

/// 展示用两位小数舍入（聚合结果本身保持原始精度）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 计数与花费的累加；比率在读取时现算
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub cost: f64,
    pub revenue: f64,
    pub conversions: u64,
    pub impressions: u64,
    pub clicks: u64,
}

impl Totals {
    pub fn add(&mut self, record: &ChannelMetricRecord) {
        self.cost += record.cost;
        self.revenue += record.revenue();
        self.conversions += record.conversions;
        self.impressions += record.impressions;
        self.clicks += record.clicks;
    }

    pub fn roi(&self) -> f64 {
        safe_div(self.revenue, self.cost)
    }

    pub fn ctr(&self) -> f64 {
        safe_div(self.clicks as f64, self.impressions as f64) * 100.0
    }

    pub fn cpc(&self) -> f64 {
        safe_div(self.cost, self.clicks as f64)
    }

    pub fn cpm(&self) -> f64 {
        safe_div(self.cost, self.impressions as f64) * 1000.0
    }

    pub fn conversion_rate(&self) -> f64 {
        safe_div(self.conversions as f64, self.clicks as f64) * 100.0
    }
}

/// 单渠道汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub name: String,
    pub spend: f64,
    pub revenue: f64,
    /// revenue / spend
    pub roi: f64,
    pub conversions: u64,
    pub impressions: u64,
    pub clicks: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub campaign_count: usize,
}

impl ChannelStats {
    pub fn from_totals(name: impl Into<String>, totals: &Totals, campaign_count: usize) -> Self {
        Self {
            name: name.into(),
            spend: totals.cost,
            revenue: totals.revenue,
            roi: totals.roi(),
            conversions: totals.conversions,
            impressions: totals.impressions,
            clicks: totals.clicks,
            ctr: totals.ctr(),
            cpc: totals.cpc(),
            campaign_count,
        }
    }
}

/// 活动摘要；孤儿活动没有状态与创建时间
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub name: String,
    pub status: Option<CampaignStatus>,
    /// 累计花费
    pub spend: f64,
    pub revenue: f64,
    pub roi: f64,
    pub channels: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CampaignSummary {
    /// 单渠道显示渠道名，多渠道显示 "Multi-Channel (A, B)"
    pub fn channel_label(&self) -> String {
        match self.channels.as_slice() {
            [] => "Unassigned".to_string(),
            [only] => only.clone(),
            many => format!("Multi-Channel ({})", many.join(", ")),
        }
    }
}

/// 摘要排序：创建时间倒序，无时间的（孤儿）排在后面，同时间按 id 升序
pub fn sort_summaries(summaries: &mut [CampaignSummary]) {
    summaries.sort_by(|a, b| match (&a.created_at, &b.created_at) {
        (Some(x), Some(y)) => y.cmp(x).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    });
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub scope: StatsScope,
    pub total_campaigns: usize,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_conversions: u64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub avg_roi: f64,
    pub avg_ctr: f64,
    pub avg_cpc: f64,
    pub avg_cpm: f64,
    pub avg_conversion_rate: f64,
    pub channels: Vec<ChannelStats>,
    pub campaign_summary: Vec<CampaignSummary>,
    pub nexus_insight: NexusInsight,
}

impl DashboardStats {
    pub fn from_parts(
        scope: StatsScope,
        total_campaigns: usize,
        totals: &Totals,
        channels: Vec<ChannelStats>,
        campaign_summary: Vec<CampaignSummary>,
    ) -> Self {
        Self {
            scope,
            total_campaigns,
            total_spend: totals.cost,
            total_revenue: totals.revenue,
            total_conversions: totals.conversions,
            total_impressions: totals.impressions,
            total_clicks: totals.clicks,
            avg_roi: totals.roi(),
            avg_ctr: totals.ctr(),
            avg_cpc: totals.cpc(),
            avg_cpm: totals.cpm(),
            avg_conversion_rate: totals.conversion_rate(),
            channels,
            campaign_summary,
            nexus_insight: NexusInsight::from_totals(totals.cost, totals.revenue),
        }
    }

    pub fn totals(&self) -> Totals {
        Totals {
            cost: self.total_spend,
            revenue: self.total_revenue,
            conversions: self.total_conversions,
            impressions: self.total_impressions,
            clicks: self.total_clicks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary(id: &str, created: Option<i64>) -> CampaignSummary {
        CampaignSummary {
            id: id.into(),
            name: id.into(),
            status: None,
            spend: 0.0,
            revenue: 0.0,
            roi: 0.0,
            channels: vec![],
            created_at: created.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        }
    }

    #[test]
    fn test_zero_totals_have_zero_ratios() {
        let t = Totals::default();
        assert_eq!(t.roi(), 0.0);
        assert_eq!(t.ctr(), 0.0);
        assert_eq!(t.cpc(), 0.0);
        assert_eq!(t.cpm(), 0.0);
        assert_eq!(t.conversion_rate(), 0.0);
    }

    #[test]
    fn test_two_records_roi() {
        let mut t = Totals::default();
        t.add(&ChannelMetricRecord::with_counts(0, 0, 0, 100.0, 2.0));
        t.add(&ChannelMetricRecord::with_counts(0, 0, 0, 300.0, 1.0));
        assert_eq!(t.cost, 400.0);
        assert_eq!(t.revenue, 500.0);
        assert_eq!(t.roi(), 1.25);
    }

    #[test]
    fn test_summary_order() {
        let mut list = vec![
            summary("orphan-b", None),
            summary("old", Some(100)),
            summary("orphan-a", None),
            summary("new-b", Some(200)),
            summary("new-a", Some(200)),
        ];
        sort_summaries(&mut list);
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new-a", "new-b", "old", "orphan-a", "orphan-b"]);
    }

    #[test]
    fn test_channel_label_and_round2() {
        let mut s = summary("x", None);
        s.channels = vec!["Email".into(), "Twitter".into()];
        assert_eq!(s.channel_label(), "Multi-Channel (Email, Twitter)");
        s.channels.truncate(1);
        assert_eq!(s.channel_label(), "Email");
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }
}
