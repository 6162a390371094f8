//! 进程内渠道注册表
//!
//! 每个渠道一把独立的读写锁：同一渠道内的读取自洽，跨渠道不保证同一快照。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::campaign::model::CampaignId;
use crate::core::RandomSource;
use crate::registry::{ChannelMetricRecord, ChannelRegistry};

#[derive(Debug, Clone)]
struct RegistryEntry {
    name: String,
    metrics: ChannelMetricRecord,
}

type ChannelBook = Arc<RwLock<BTreeMap<CampaignId, RegistryEntry>>>;

pub struct InMemoryChannelRegistry {
    books: RwLock<BTreeMap<String, ChannelBook>>,
    rng: Arc<dyn RandomSource>,
}

impl InMemoryChannelRegistry {
    pub fn new(rng: Arc<dyn RandomSource>) -> Self {
        Self {
            books: RwLock::new(BTreeMap::new()),
            rng,
        }
    }

    /// 预建一组空渠道
    pub fn with_channels<I, S>(channels: I, rng: Arc<dyn RandomSource>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let books = channels
            .into_iter()
            .map(|c| (c.into(), ChannelBook::default()))
            .collect();
        Self {
            books: RwLock::new(books),
            rng,
        }
    }

    async fn book(&self, channel: &str) -> Option<ChannelBook> {
        self.books.read().await.get(channel).cloned()
    }

    async fn book_or_create(&self, channel: &str) -> ChannelBook {
        if let Some(book) = self.book(channel).await {
            return book;
        }
        let mut books = self.books.write().await;
        books
            .entry(channel.to_string())
            .or_insert_with(|| {
                tracing::info!("Creating new channel registry: {}", channel);
                ChannelBook::default()
            })
            .clone()
    }

    /// 直接写入一条指标（种子数据、外部同步）
    pub async fn insert_record(
        &self,
        channel: &str,
        campaign_id: &str,
        name: &str,
        metrics: ChannelMetricRecord,
    ) {
        let book = self.book_or_create(channel).await;
        book.write().await.insert(
            campaign_id.to_string(),
            RegistryEntry {
                name: name.to_string(),
                metrics,
            },
        );
    }
}

#[async_trait]
impl ChannelRegistry for InMemoryChannelRegistry {
    async fn channels(&self) -> Vec<String> {
        self.books.read().await.keys().cloned().collect()
    }

    async fn list_campaign_ids(&self, channel: &str) -> BTreeSet<CampaignId> {
        match self.book(channel).await {
            Some(book) => book.read().await.keys().cloned().collect(),
            None => BTreeSet::new(),
        }
    }

    async fn get_metrics(&self, channel: &str, campaign_id: &str) -> Option<ChannelMetricRecord> {
        let book = self.book(channel).await?;
        let guard = book.read().await;
        guard.get(campaign_id).map(|e| e.metrics.clone())
    }

    async fn campaign_name(&self, channel: &str, campaign_id: &str) -> Option<String> {
        let book = self.book(channel).await?;
        let guard = book.read().await;
        guard.get(campaign_id).map(|e| e.name.clone())
    }

    async fn register(
        &self,
        channel: &str,
        campaign_id: &str,
        name: &str,
        budget: f64,
        _objective: &str,
    ) {
        let metrics = ChannelMetricRecord::simulated(channel, budget, self.rng.as_ref());
        let book = self.book_or_create(channel).await;
        book.write().await.insert(
            campaign_id.to_string(),
            RegistryEntry {
                name: name.to_string(),
                metrics,
            },
        );
        tracing::debug!(channel, campaign_id, "campaign registered on channel");
    }

    async fn remove(&self, channel: &str, campaign_id: &str) -> bool {
        match self.book(channel).await {
            Some(book) => book.write().await.remove(campaign_id).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SeededRandom;

    fn registry() -> InMemoryChannelRegistry {
        InMemoryChannelRegistry::with_channels(["Email", "Instagram"], Arc::new(SeededRandom::new(7)))
    }

    #[tokio::test]
    async fn test_register_creates_channel_and_metrics() {
        let reg = registry();
        reg.register("Twitter", "c1", "Launch", 1000.0, "Sales").await;

        assert_eq!(reg.channels().await, vec!["Email", "Instagram", "Twitter"]);
        assert!(reg.list_campaign_ids("Twitter").await.contains("c1"));
        assert_eq!(reg.campaign_name("Twitter", "c1").await.as_deref(), Some("Launch"));
        let m = reg.get_metrics("Twitter", "c1").await.unwrap();
        assert_eq!(m.budget, 1000.0);
        assert!(m.impressions >= 5000);
    }

    #[tokio::test]
    async fn test_missing_record_is_none_and_defaults_to_zero() {
        let reg = registry();
        assert!(reg.get_metrics("Email", "nope").await.is_none());
        assert!(reg.get_metrics("Nowhere", "nope").await.is_none());
        let zero = reg.get_metrics("Email", "nope").await.unwrap_or_default();
        assert_eq!(zero.sentiment_score, 0.5);
    }

    #[tokio::test]
    async fn test_records_for_and_remove() {
        let reg = registry();
        reg.insert_record("Instagram", "c1", "A", ChannelMetricRecord::with_counts(10, 1, 0, 5.0, 2.0))
            .await;
        reg.insert_record("Email", "c1", "A", ChannelMetricRecord::with_counts(20, 2, 1, 3.0, 1.0))
            .await;
        reg.insert_record("Email", "c2", "B", ChannelMetricRecord::default()).await;

        let records = reg.records_for("c1").await;
        let channels: Vec<&str> = records.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(channels, vec!["Email", "Instagram"]);

        let index = reg.campaign_index().await;
        assert_eq!(index["c1"].len(), 2);
        assert_eq!(index["c2"].len(), 1);

        assert!(reg.remove("Email", "c1").await);
        assert!(!reg.remove("Email", "c1").await);
        assert_eq!(reg.records_for("c1").await.len(), 1);
    }
}
