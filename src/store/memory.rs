use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::campaign::lifecycle::CampaignStatus;
use crate::campaign::model::{AiDecision, Campaign, CampaignId, CampaignUpdate, NewDecision, StatsScope};
use crate::store::{CampaignStore, StatusWrite};

#[derive(Default)]
struct DecisionLog {
    next_seq: u64,
    entries: Vec<AiDecision>,
}

/// 进程内存储；决策日志的 seq 在同一把锁下分配，保证单调递增
#[derive(Default)]
pub struct InMemoryCampaignStore {
    campaigns: RwLock<HashMap<CampaignId, Campaign>>,
    decisions: RwLock<DecisionLog>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn save(&self, campaign: Campaign) {
        self.campaigns
            .write()
            .await
            .insert(campaign.id.clone(), campaign);
    }

    async fn save_if_absent(&self, campaign: Campaign) -> bool {
        match self.campaigns.write().await.entry(campaign.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(campaign);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    async fn get(&self, id: &str) -> Option<Campaign> {
        self.campaigns.read().await.get(id).cloned()
    }

    async fn list(&self) -> Vec<Campaign> {
        let mut all: Vec<Campaign> = self.campaigns.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    async fn update_status(&self, id: &str, status: CampaignStatus) -> bool {
        match self.campaigns.write().await.get_mut(id) {
            Some(c) if c.status.is_terminal() && !status.is_terminal() => false,
            Some(c) => {
                c.status = status;
                true
            }
            None => false,
        }
    }

    async fn update_status_if(
        &self,
        id: &str,
        expected: CampaignStatus,
        status: CampaignStatus,
    ) -> StatusWrite {
        match self.campaigns.write().await.get_mut(id) {
            Some(c) if c.status != expected || c.status.is_terminal() => {
                StatusWrite::Conflict(c.status)
            }
            Some(c) => {
                c.status = status;
                StatusWrite::Applied
            }
            None => StatusWrite::Missing,
        }
    }

    async fn update(&self, id: &str, update: &CampaignUpdate) -> bool {
        match self.campaigns.write().await.get_mut(id) {
            Some(c) => {
                update.apply(c);
                true
            }
            None => false,
        }
    }

    async fn delete(&self, id: &str) -> bool {
        self.campaigns.write().await.remove(id).is_some()
    }

    async fn append_decision(&self, decision: NewDecision) -> AiDecision {
        let mut log = self.decisions.write().await;
        log.next_seq += 1;
        let entry = AiDecision {
            seq: log.next_seq,
            campaign_id: decision.campaign_id,
            decision_type: decision.decision_type,
            payload: decision.payload,
            timestamp: Utc::now(),
        };
        log.entries.push(entry.clone());
        entry
    }

    async fn list_decisions(&self, scope: &StatsScope, limit: usize) -> Vec<AiDecision> {
        let log = self.decisions.read().await;
        log.entries
            .iter()
            .rev()
            .filter(|d| match scope {
                StatsScope::All => true,
                StatsScope::Campaign(id) => d.campaign_id.as_deref() == Some(id.as_str()),
            })
            .take(limit)
            .cloned()
            .collect()
    }

    async fn purge_decisions(&self) -> usize {
        let mut log = self.decisions.write().await;
        let purged = log.entries.len();
        log.entries.clear();
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_decision_log_is_append_only_and_ordered() {
        let store = InMemoryCampaignStore::new();
        store
            .append_decision(NewDecision::new(Some("a".into()), "StatusUpdate", json!({"n": 1})))
            .await;
        store
            .append_decision(NewDecision::new(None, "Cost Reduction", json!({"n": 2})))
            .await;
        let third = store
            .append_decision(NewDecision::new(Some("a".into()), "StatusUpdate", json!({"n": 3})))
            .await;
        assert_eq!(third.seq, 3);

        let all = store.list_decisions(&StatsScope::All, 10).await;
        let seqs: Vec<u64> = all.iter().map(|d| d.seq).collect();
        assert_eq!(seqs, vec![3, 2, 1]);

        let scoped = store.list_decisions(&StatsScope::Campaign("a".into()), 1).await;
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].payload["n"], 3);

        assert_eq!(store.purge_decisions().await, 3);
        assert!(store.list_decisions(&StatsScope::All, 10).await.is_empty());

        // 清空后 seq 继续递增
        let next = store.append_decision(NewDecision::new(None, "x", json!(null))).await;
        assert_eq!(next.seq, 4);
    }

    fn campaign(id: &str, budget: f64, status: CampaignStatus) -> Campaign {
        let mut c = Campaign::restored(id, "n", vec!["Email".to_string()]);
        c.budget = budget;
        c.status = status;
        c
    }

    #[tokio::test]
    async fn test_conditional_status_write() {
        let store = InMemoryCampaignStore::new();
        store.save(campaign("c1", 10.0, CampaignStatus::Paused)).await;

        let stale = store
            .update_status_if("c1", CampaignStatus::Active, CampaignStatus::Paused)
            .await;
        assert_eq!(stale, StatusWrite::Conflict(CampaignStatus::Paused));

        let applied = store
            .update_status_if("c1", CampaignStatus::Paused, CampaignStatus::Terminated)
            .await;
        assert_eq!(applied, StatusWrite::Applied);

        // 终止后即使预期匹配也拒绝
        let after = store
            .update_status_if("c1", CampaignStatus::Terminated, CampaignStatus::Active)
            .await;
        assert_eq!(after, StatusWrite::Conflict(CampaignStatus::Terminated));
        assert!(!store.update_status("c1", CampaignStatus::Active).await);
        assert!(store.update_status("c1", CampaignStatus::Terminated).await);
        assert_eq!(store.get("c1").await.unwrap().status, CampaignStatus::Terminated);

        let missing = store
            .update_status_if("nope", CampaignStatus::Draft, CampaignStatus::Active)
            .await;
        assert_eq!(missing, StatusWrite::Missing);
    }

    #[tokio::test]
    async fn test_save_if_absent_keeps_existing() {
        let store = InMemoryCampaignStore::new();
        assert!(store.save_if_absent(campaign("c1", 1234.0, CampaignStatus::Draft)).await);
        assert!(!store.save_if_absent(campaign("c1", 50000.0, CampaignStatus::Active)).await);

        let kept = store.get("c1").await.unwrap();
        assert_eq!(kept.budget, 1234.0);
        assert_eq!(kept.status, CampaignStatus::Draft);
    }
}
