//! 合成趋势：以当前总量为基线外推每日序列
//!
//! 仅用于展示走势形状，数值不是实测数据。

use std::f64::consts::PI;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::campaign::StatsScope;
use crate::core::{HiveError, HiveResult, RandomSource};
use crate::dashboard::{AggregationEngine, Totals};

/// 基线窗口（天）：日均 = 总量 / 30
pub const BASELINE_WINDOW_DAYS: f64 = 30.0;

/// 合成序列最长天数（约十年）
pub const MAX_TREND_DAYS: usize = 3650;

fn check_days(days: usize) -> HiveResult<()> {
    if days > MAX_TREND_DAYS {
        return Err(HiveError::Validation(format!(
            "trend window must be at most {MAX_TREND_DAYS} days, got {days}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendMetric {
    Revenue,
    Impressions,
    Clicks,
    Conversions,
    Spend,
}

impl TrendMetric {
    /// 总量为 0 时使用的日均默认值
    pub fn zero_baseline(self) -> f64 {
        match self {
            Self::Revenue => 1000.0,
            Self::Impressions => 1000.0,
            Self::Clicks => 50.0,
            Self::Conversions => 10.0,
            Self::Spend => 500.0,
        }
    }

    pub fn total(self, totals: &Totals) -> f64 {
        match self {
            Self::Revenue => totals.revenue,
            Self::Impressions => totals.impressions as f64,
            Self::Clicks => totals.clicks as f64,
            Self::Conversions => totals.conversions as f64,
            Self::Spend => totals.cost,
        }
    }

    pub fn daily_baseline(self, totals: &Totals) -> f64 {
        let total = self.total(totals);
        if total > 0.0 {
            total / BASELINE_WINDOW_DAYS
        } else {
            self.zero_baseline()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// "Mon DD"
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

/// 以 end 为最后一天，向前排列 days 天
fn dates_ending(end: NaiveDate, days: usize) -> impl Iterator<Item = (usize, NaiveDate)> {
    (0..days).map(move |i| (i, end - Duration::days((days - 1 - i) as i64)))
}

/// value_i = base × (1 + 0.2·i/days + 0.1·sin(i/7·π) + U(−0.05, 0.05))，下限 0
pub fn project_series(
    base: f64,
    days: usize,
    end: NaiveDate,
    rng: &dyn RandomSource,
) -> Vec<TrendPoint> {
    dates_ending(end, days)
        .map(|(i, date)| {
            let growth = 1.0 + 0.2 * i as f64 / days as f64;
            let seasonality = 0.1 * (i as f64 / 7.0 * PI).sin();
            let noise = rng.uniform(-0.05, 0.05);
            TrendPoint {
                date,
                label: date.format("%b %d").to_string(),
                value: (base * (growth + seasonality + noise)).max(0.0),
            }
        })
        .collect()
}

/// 展示量按 1 + 0.3·sin(i/10) + U(−0.1, 0.1) 波动；点击、转化在此基础上再抖动 ±15% / ±20%
pub fn performance_series(
    totals: &Totals,
    days: usize,
    end: NaiveDate,
    rng: &dyn RandomSource,
) -> Vec<PerformancePoint> {
    let imp_base = TrendMetric::Impressions.daily_baseline(totals);
    let click_base = TrendMetric::Clicks.daily_baseline(totals);
    let conv_base = TrendMetric::Conversions.daily_baseline(totals);

    dates_ending(end, days)
        .map(|(i, date)| {
            let imp_factor = 1.0 + 0.3 * (i as f64 / 10.0).sin() + rng.uniform(-0.1, 0.1);
            let click_factor = imp_factor * (1.0 + rng.uniform(-0.15, 0.15));
            let conv_factor = imp_factor * (1.0 + rng.uniform(-0.2, 0.2));
            PerformancePoint {
                date,
                impressions: (imp_base * imp_factor).max(0.0) as u64,
                clicks: (click_base * click_factor).max(0.0) as u64,
                conversions: (conv_base * conv_factor).max(0.0) as u64,
            }
        })
        .collect()
}

impl AggregationEngine {
    /// 某个指标的合成日序列（最后一天为今天）
    pub async fn project_trend(
        &self,
        scope: &StatsScope,
        days: usize,
        metric: TrendMetric,
    ) -> HiveResult<Vec<TrendPoint>> {
        check_days(days)?;
        let stats = self.compute_stats(scope).await?;
        let base = metric.daily_baseline(&stats.totals());
        Ok(project_series(
            base,
            days,
            Utc::now().date_naive(),
            self.rng.as_ref(),
        ))
    }

    /// 展示量 / 点击 / 转化的合成日序列
    pub async fn performance_trends(
        &self,
        scope: &StatsScope,
        days: usize,
    ) -> HiveResult<Vec<PerformancePoint>> {
        check_days(days)?;
        let stats = self.compute_stats(scope).await?;
        Ok(performance_series(
            &stats.totals(),
            days,
            Utc::now().date_naive(),
            self.rng.as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedRandom;
    use crate::dashboard::test_support::fixture_with;
    use crate::registry::ChannelMetricRecord;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
    }

    #[test]
    fn test_zero_baseline_defaults() {
        let zero = Totals::default();
        assert_eq!(TrendMetric::Revenue.daily_baseline(&zero), 1000.0);
        assert_eq!(TrendMetric::Clicks.daily_baseline(&zero), 50.0);
        assert_eq!(TrendMetric::Conversions.daily_baseline(&zero), 10.0);
        assert_eq!(TrendMetric::Spend.daily_baseline(&zero), 500.0);

        let t = Totals {
            revenue: 3000.0,
            ..Totals::default()
        };
        assert_eq!(TrendMetric::Revenue.daily_baseline(&t), 100.0);
    }

    #[test]
    fn test_series_shape_with_midpoint_noise() {
        // FixedRandom(0.5) 让噪声项为 0
        let series = project_series(100.0, 30, end(), &FixedRandom(0.5));
        assert_eq!(series.len(), 30);
        assert_eq!(series[29].date, end());
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(series[29].label, "Mar 31");
        assert!((series[0].value - 100.0).abs() < 1e-9);
        let expected_7 = 100.0 * (1.0 + 0.2 * 7.0 / 30.0 + 0.1 * PI.sin());
        assert!((series[7].value - expected_7).abs() < 1e-9);
    }

    #[test]
    fn test_series_never_negative_and_empty_when_no_days() {
        let series = project_series(0.0, 10, end(), &FixedRandom(0.0));
        assert!(series.iter().all(|p| p.value >= 0.0));
        assert!(project_series(100.0, 0, end(), &FixedRandom(0.5)).is_empty());
    }

    #[test]
    fn test_performance_series_defaults() {
        let series = performance_series(&Totals::default(), 5, end(), &FixedRandom(0.5));
        assert_eq!(series.len(), 5);
        // i = 0：因子恰为 1
        assert_eq!(series[0].impressions, 1000);
        assert_eq!(series[0].clicks, 50);
        assert_eq!(series[0].conversions, 10);
    }

    #[tokio::test]
    async fn test_project_trend_from_revenue() {
        let f = fixture_with(&["Email"], 0.5);
        f.registry
            .insert_record("Email", "c", "C", ChannelMetricRecord::with_counts(0, 0, 0, 300.0, 2.0))
            .await;
        let series = f
            .engine
            .project_trend(&StatsScope::All, 30, TrendMetric::Revenue)
            .await
            .unwrap();
        assert_eq!(series.len(), 30);
        assert!((series[0].value - 20.0).abs() < 1e-9);

        let err = f
            .engine
            .project_trend(&StatsScope::Campaign("nope".into()), 30, TrendMetric::Revenue)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_trend_window_is_capped() {
        let f = fixture_with(&["Email"], 0.5);
        let err = f
            .engine
            .project_trend(&StatsScope::All, usize::MAX, TrendMetric::Revenue)
            .await
            .unwrap_err();
        assert!(matches!(err, HiveError::Validation(_)));

        let err = f
            .engine
            .performance_trends(&StatsScope::All, MAX_TREND_DAYS + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, HiveError::Validation(_)));

        let longest = f
            .engine
            .performance_trends(&StatsScope::All, MAX_TREND_DAYS)
            .await
            .unwrap();
        assert_eq!(longest.len(), MAX_TREND_DAYS);
        assert_eq!(f.mock.call_count(), 0);
    }
}
