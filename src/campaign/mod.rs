//! 活动：数据模型、生命周期状态机与编排

pub mod lifecycle;
pub mod model;
pub mod orchestrator;

pub use lifecycle::{advise, CampaignStatus, LifecycleAction, TargetStatus};
pub use model::{
    AiDecision, Campaign, CampaignId, CampaignSpec, CampaignUpdate, NewDecision, StatsScope,
};
pub use orchestrator::{CampaignOrchestrator, DecisionSource, TransitionOutcome, STATUS_UPDATE};
