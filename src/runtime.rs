//! 运行时装配
//!
//! 从配置构建推理后端、渠道注册表、活动存储与随机源，
//! 组装出共享同一组 Agent 的 CampaignOrchestrator 与 AggregationEngine，供 CLI / 上层服务调用。

use std::sync::Arc;

use crate::agents::{ActivityLog, AgentSuite};
use crate::campaign::CampaignOrchestrator;
use crate::config::AppConfig;
use crate::core::{EntropyRandom, RandomSource};
use crate::dashboard::AggregationEngine;
use crate::llm::{create_reasoning_client, ReasoningClient};
use crate::registry::{ChannelRegistry, InMemoryChannelRegistry};
use crate::store::{CampaignStore, InMemoryCampaignStore};

/// 组装完成的系统：编排与聚合共享注册表、存储与活动日志
pub struct HiveRuntime {
    pub orchestrator: CampaignOrchestrator,
    pub dashboard: AggregationEngine,
    pub activity: ActivityLog,
}

impl HiveRuntime {
    /// 生产装配：按配置选择推理后端，注册表预置 dashboard.channels，存储在进程内
    pub fn from_config(cfg: &AppConfig) -> Self {
        let rng: Arc<dyn RandomSource> = Arc::new(EntropyRandom::new());
        let client = create_reasoning_client(cfg);
        let registry: Arc<dyn ChannelRegistry> = Arc::new(InMemoryChannelRegistry::with_channels(
            cfg.dashboard.channels.iter().cloned(),
            rng.clone(),
        ));
        let store: Arc<dyn CampaignStore> = Arc::new(InMemoryCampaignStore::new());
        Self::with_components(client, registry, store, rng, cfg)
    }

    /// 显式注入各组件（测试中用 Mock 后端与固定随机源）
    pub fn with_components(
        client: Arc<dyn ReasoningClient>,
        registry: Arc<dyn ChannelRegistry>,
        store: Arc<dyn CampaignStore>,
        rng: Arc<dyn RandomSource>,
        cfg: &AppConfig,
    ) -> Self {
        let activity = ActivityLog::new();
        let agents = Arc::new(AgentSuite::new(client, activity.clone()));
        let orchestrator = CampaignOrchestrator::new(
            agents.clone(),
            registry.clone(),
            store.clone(),
            rng.clone(),
            cfg.orchestrator.clone(),
        );
        let dashboard = AggregationEngine::new(registry, store, agents, rng, cfg.dashboard.clone());
        tracing::info!(
            "Hive runtime ready ({} preset channels)",
            cfg.dashboard.channels.len()
        );
        Self {
            orchestrator,
            dashboard,
            activity,
        }
    }
}
