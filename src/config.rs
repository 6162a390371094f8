//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::dashboard::MAX_TREND_DAYS;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub dashboard: DashboardSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai / mock；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmDeepSeekSection,
    #[serde(default)]
    pub openai: LlmOpenAiSection,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次推理请求超时（秒），超时按 ClientFailure 处理
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

/// [orchestrator] 段：活动初始化时的渠道扩展策略
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    /// 请求渠道中没有扩展渠道时，自动追加的概率（产品决策，默认 0.7）
    #[serde(default = "default_expansion_probability")]
    pub email_expansion_probability: f64,
    #[serde(default = "default_expansion_channel")]
    pub expansion_channel: String,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            email_expansion_probability: default_expansion_probability(),
            expansion_channel: default_expansion_channel(),
        }
    }
}

fn default_expansion_probability() -> f64 {
    0.7
}

fn default_expansion_channel() -> String {
    "Email".to_string()
}

/// [dashboard] 段：聚合视图的展示上限与已知渠道
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSection {
    /// 全局视图中活动摘要的条数上限
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
    /// 决策日志默认返回条数
    #[serde(default = "default_decision_limit")]
    pub decision_limit: usize,
    #[serde(default = "default_trend_days")]
    pub trend_days: usize,
    /// 启动时预建的渠道注册表
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            summary_limit: default_summary_limit(),
            decision_limit: default_decision_limit(),
            trend_days: default_trend_days(),
            channels: default_channels(),
        }
    }
}

fn default_summary_limit() -> usize {
    5
}

fn default_decision_limit() -> usize {
    10
}

fn default_trend_days() -> usize {
    30
}

fn default_channels() -> Vec<String> {
    vec![
        "Email".into(),
        "Facebook".into(),
        "Google Ads".into(),
        "Instagram".into(),
        "Twitter".into(),
    ]
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(
                config::File::with_name(name).required(false),
            );
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    let cfg: AppConfig = c.try_deserialize()?;
    cfg.validate()
        .map_err(config::ConfigError::Message)?;
    Ok(cfg)
}

impl AppConfig {
    /// 检查取值范围：概率必须在 [0,1]，摘要上限至少为 1，趋势天数不超过上限
    pub fn validate(&self) -> Result<(), String> {
        let p = self.orchestrator.email_expansion_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(format!(
                "orchestrator.email_expansion_probability must be within [0, 1], got {p}"
            ));
        }
        if self.dashboard.summary_limit == 0 {
            return Err("dashboard.summary_limit must be at least 1".to_string());
        }
        if self.dashboard.trend_days > MAX_TREND_DAYS {
            return Err(format!(
                "dashboard.trend_days must be at most {MAX_TREND_DAYS}, got {}",
                self.dashboard.trend_days
            ));
        }
        Ok(())
    }
}
