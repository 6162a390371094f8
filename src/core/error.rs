//! 领域错误类型
//!
//! 推理后端失败（ClientFailure）在 SchemaAgent 边界内被完全吸收；这里只保留需要向调用方暴露的错误：
//! 找不到实体、调用方输入非法、并发状态冲突与配置错误。

use thiserror::Error;

/// 编排层 / 聚合层对外暴露的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HiveError {
    /// 活动或渠道记录不存在（查找边界向上传播一层后翻译为结构化结果）
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// 调用方输入非法（如预算非数字、名称为空），在调用任何 Agent 之前拒绝
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 裁决期间状态被并发修改，本次写入被放弃
    #[error("Campaign {id} status changed concurrently: expected {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl HiveError {
    pub fn campaign_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Campaign",
            id: id.into(),
        }
    }

    pub fn status_conflict(
        id: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::Conflict {
            id: id.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type HiveResult<T> = Result<T, HiveError>;
