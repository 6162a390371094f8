//! Hive - Rust 营销活动智能体系统
//!
//! 模块划分：
//! - **agents**: 结构化输出的推理 Agent（规划、渠道推荐、ROI、排期、执行、洞察、生命周期等）与活动日志
//! - **campaign**: 活动模型、生命周期状态机与编排（创建、状态迁移、孤儿收养、级联删除）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 领域错误与可注入随机源
//! - **dashboard**: 跨渠道指标聚合、健康度、趋势与战略洞察
//! - **llm**: 推理后端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: tracing 日志初始化
//! - **registry**: 按渠道划分的指标注册表
//! - **runtime**: 按配置装配完整系统
//! - **store**: 活动与决策日志存储

pub mod agents;
pub mod campaign;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod llm;
pub mod observability;
pub mod registry;
pub mod runtime;
pub mod store;

pub use runtime::HiveRuntime;
