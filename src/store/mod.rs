//! 活动与决策日志的持久化边界

pub mod memory;

use async_trait::async_trait;

pub use memory::InMemoryCampaignStore;

use crate::campaign::lifecycle::CampaignStatus;
use crate::campaign::model::{AiDecision, Campaign, CampaignUpdate, NewDecision, StatsScope};

/// 条件状态写入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    Applied,
    /// 当前状态与预期不符（或已终止），未写入
    Conflict(CampaignStatus),
    Missing,
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// 新建或整体覆盖
    async fn save(&self, campaign: Campaign);

    /// 仅在 ID 不存在时插入，返回是否插入
    async fn save_if_absent(&self, campaign: Campaign) -> bool;

    async fn get(&self, id: &str) -> Option<Campaign>;

    /// 按创建时间倒序（同一时间按 id 升序）
    async fn list(&self) -> Vec<Campaign>;

    /// 返回是否写入；已终止的活动只接受 Terminated
    async fn update_status(&self, id: &str, status: CampaignStatus) -> bool;

    /// 比较并写入：当前状态等于 `expected` 且未终止时才写
    async fn update_status_if(
        &self,
        id: &str,
        expected: CampaignStatus,
        status: CampaignStatus,
    ) -> StatusWrite;

    async fn update(&self, id: &str, update: &CampaignUpdate) -> bool;

    async fn delete(&self, id: &str) -> bool;

    async fn append_decision(&self, decision: NewDecision) -> AiDecision;

    /// 按范围过滤，最新在前；全局范围返回所有决策
    async fn list_decisions(&self, scope: &StatsScope, limit: usize) -> Vec<AiDecision>;

    /// 清空决策日志，返回清除条数
    async fn purge_decisions(&self) -> usize;
}
