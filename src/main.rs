//! Hive - Rust 营销活动智能体系统
//!
//! 入口：初始化日志与配置，装配运行时，跑一遍「创建活动 → 启动 → 汇总 → 洞察」并以 JSON 输出。
//! 用法：hive [配置文件路径]

use std::path::PathBuf;

use anyhow::Context;
use hive::campaign::{CampaignSpec, StatsScope};
use hive::config::{load_config, AppConfig};
use hive::core::HiveError;
use hive::dashboard::{round2, TrendMetric};
use hive::{observability, HiveRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };
    cfg.validate().map_err(HiveError::Config)?;

    let runtime = HiveRuntime::from_config(&cfg);

    let spec = CampaignSpec::parse(
        "Monsoon Launch",
        "Sales",
        "50000",
        ["Instagram", "Facebook"],
    )
    .context("Invalid campaign input")?;
    let campaign = runtime
        .orchestrator
        .create_campaign(&spec)
        .await
        .context("Failed to create campaign")?;
    println!("{}", serde_json::to_string_pretty(&campaign)?);

    let outcome = runtime
        .orchestrator
        .transition_campaign(&campaign.id, "launch")
        .await
        .context("Failed to launch campaign")?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    let stats = runtime
        .dashboard
        .compute_stats(&StatsScope::All)
        .await
        .context("Failed to compute dashboard stats")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    for summary in &stats.campaign_summary {
        tracing::info!(
            "{} [{}]: spend {} / revenue {} / ROI {}",
            summary.name,
            summary.channel_label(),
            round2(summary.spend),
            round2(summary.revenue),
            round2(summary.roi)
        );
    }

    let days = runtime.dashboard.settings().trend_days;
    let trend = runtime
        .dashboard
        .project_trend(&StatsScope::All, days, TrendMetric::Revenue)
        .await
        .context("Failed to project trend")?;
    println!("{}", serde_json::to_string_pretty(&trend)?);

    let insights = runtime
        .dashboard
        .get_insights(&StatsScope::All)
        .await
        .context("Failed to generate insights")?;
    println!("{}", serde_json::to_string_pretty(&insights)?);

    tracing::info!("{} agent activities recorded", runtime.activity.len());
    Ok(())
}
