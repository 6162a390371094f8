//! 单渠道上单个活动的指标记录
//!
//! 只存原始计数与花费；CTR / CPC / CPM / 转化率 / 收入都由计数现算，避免与计数不一致。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::RandomSource;

/// 比率计算：分母为 0 时返回 0
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceInsight {
    pub primary_segment: String,
    pub top_region: Option<String>,
    pub engagement_depth: String,
}

impl Default for AudienceInsight {
    fn default() -> Self {
        Self {
            primary_segment: "Unknown".to_string(),
            top_region: None,
            engagement_depth: "Low".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ForecastData {
    pub projected_roi: f64,
    pub projected_conversions: u64,
    /// "NN%"
    pub confidence_score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduleData {
    pub duration_days: u32,
    pub frequency: String,
}

/// 缺失记录时的默认值即「零记录」：计数与花费为 0，情绪 0.5，受众 Unknown / Low
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetricRecord {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: f64,
    /// 收入 / 花费 的倍数
    pub roi: f64,
    pub sentiment_score: f64,
    pub audience_insight: AudienceInsight,
    pub forecast: ForecastData,
    pub schedule: ScheduleData,
    pub budget: f64,
    pub target_audience: u64,
    pub detailed_stats: BTreeMap<String, String>,
}

impl Default for ChannelMetricRecord {
    fn default() -> Self {
        Self {
            impressions: 0,
            clicks: 0,
            conversions: 0,
            cost: 0.0,
            roi: 0.0,
            sentiment_score: 0.5,
            audience_insight: AudienceInsight::default(),
            forecast: ForecastData::default(),
            schedule: ScheduleData::default(),
            budget: 0.0,
            target_audience: 0,
            detailed_stats: BTreeMap::new(),
        }
    }
}

impl ChannelMetricRecord {
    /// 仅计数与花费，其余取零记录默认值
    pub fn with_counts(impressions: u64, clicks: u64, conversions: u64, cost: f64, roi: f64) -> Self {
        Self {
            impressions,
            clicks,
            conversions,
            cost,
            roi,
            ..Self::default()
        }
    }

    pub fn revenue(&self) -> f64 {
        self.cost * self.roi
    }

    /// 点击率（百分比）
    pub fn ctr(&self) -> f64 {
        safe_div(self.clicks as f64, self.impressions as f64) * 100.0
    }

    pub fn cpc(&self) -> f64 {
        safe_div(self.cost, self.clicks as f64)
    }

    pub fn cpm(&self) -> f64 {
        safe_div(self.cost, self.impressions as f64) * 1000.0
    }

    /// 转化率（百分比）
    pub fn conversion_rate(&self) -> f64 {
        safe_div(self.conversions as f64, self.clicks as f64) * 100.0
    }

    /// 注册到渠道时生成的模拟指标（仅用于演示，不代表真实数据）
    pub fn simulated(channel: &str, budget: f64, rng: &dyn RandomSource) -> Self {
        let forecast = ForecastData {
            projected_roi: round_to(rng.uniform(1.5, 4.5), 1),
            projected_conversions: rng.int_between(50, 500),
            confidence_score: format!("{}%", rng.int_between(65, 95)),
        };
        let schedule = ScheduleData {
            duration_days: 30,
            frequency: "Daily".to_string(),
        };

        if channel.eq_ignore_ascii_case("email") {
            Self {
                impressions: rng.int_between(1000, 5000),
                clicks: rng.int_between(100, 800),
                cost: round_to(rng.uniform(100.0, 500.0), 2),
                conversions: rng.int_between(10, 50),
                roi: round_to(rng.uniform(1.2, 3.5), 2),
                sentiment_score: round_to(rng.uniform(0.6, 0.95), 2),
                audience_insight: AudienceInsight {
                    primary_segment: rng.choose(&["Loyal", "New", "At-Risk", "High-Value"]).to_string(),
                    top_region: Some(
                        rng.choose(&["North America", "Europe", "Asia", "Global"]).to_string(),
                    ),
                    engagement_depth: rng.choose(&["High", "Medium", "Low"]).to_string(),
                },
                forecast,
                schedule,
                budget,
                target_audience: 10_000,
                detailed_stats: BTreeMap::from([
                    ("Open Rate".to_string(), format!("{}%", rng.int_between(15, 35))),
                    ("Click Rate".to_string(), format!("{}%", rng.int_between(2, 8))),
                ]),
            }
        } else {
            Self {
                impressions: rng.int_between(5000, 20000),
                clicks: rng.int_between(200, 1500),
                cost: round_to(rng.uniform(200.0, 1000.0), 2),
                conversions: rng.int_between(20, 150),
                roi: round_to(rng.uniform(1.5, 4.0), 2),
                sentiment_score: round_to(rng.uniform(0.4, 0.9), 2),
                audience_insight: AudienceInsight {
                    primary_segment: rng
                        .choose(&["Tech Enthusiasts", "Fashionistas", "Gamers", "Professionals"])
                        .to_string(),
                    top_region: None,
                    engagement_depth: rng.choose(&["High", "Medium"]).to_string(),
                },
                forecast,
                schedule,
                budget,
                target_audience: 10_000,
                detailed_stats: BTreeMap::from([
                    ("Ad 1".to_string(), rng.choose(&["Winner", "Active", "Learning"]).to_string()),
                    ("Ad 2".to_string(), "Testing".to_string()),
                ]),
            }
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
