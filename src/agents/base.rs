//! SchemaAgent：容错调用契约
//!
//! 每个专用 Agent 只提供三样东西（见 AgentSpec）：prompt 模板、输出结构（类型即 Schema）、确定性兜底结果。
//! 模板拼装、Schema 提示生成、输出清洗与解析、失败兜底都在 SchemaAgent 里统一完成：
//!
//! 1. 记录活动日志
//! 2. 以 schemars 生成的 JSON Schema 作为 schema_hint 调用 ReasoningClient
//! 3. 剥离 ```json 代码块，解析为类型化结果，执行 Validate 与 AgentSpec::check
//! 4. 任一步失败（后端不可达、超时、解析失败、校验失败）都返回 AgentResult::Fallback
//!
//! invoke 永远不会向外返回错误。

use std::sync::{Arc, OnceLock};

use regex::Regex;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::agents::ActivityLog;
use crate::llm::{ClientFailure, ReasoningClient};

/// 输出结构的值域校验（范围、枚举、定长列表等）
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// 专用 Agent 的三个可变点：prompt、Schema（Output 类型）、兜底
pub trait AgentSpec: Send + Sync {
    type Input: Send + Sync;
    type Output: DeserializeOwned + Serialize + JsonSchema + Validate + Clone + Send;

    /// Agent 名（活动日志）
    const NAME: &'static str;
    /// 角色（活动日志）
    const ROLE: &'static str;

    /// 活动日志中的动作描述
    fn action(&self, input: &Self::Input) -> String;

    /// 根据输入拼 prompt（不含 Schema 提示）
    fn prompt(&self, input: &Self::Input) -> String;

    /// 确定性兜底：同样的输入永远得到同样的结果，且满足 Output 的 Schema
    fn fallback(&self, input: &Self::Input) -> Self::Output;

    /// 依赖输入的附加校验（如部署清单必须覆盖请求的渠道）；默认通过
    fn check(&self, _input: &Self::Input, _output: &Self::Output) -> Result<(), String> {
        Ok(())
    }
}

/// Agent 调用结果：后端生成或兜底，两者结构一致，下游无需区分
#[derive(Debug, Clone, PartialEq)]
pub enum AgentResult<T> {
    /// 后端返回并通过校验
    Generated(T),
    /// 后端失败，使用确定性兜底
    Fallback(T),
}

impl<T> AgentResult<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn document(&self) -> &T {
        match self {
            Self::Generated(doc) | Self::Fallback(doc) => doc,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Generated(doc) | Self::Fallback(doc) => doc,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AgentResult<U> {
        match self {
            Self::Generated(doc) => AgentResult::Generated(f(doc)),
            Self::Fallback(doc) => AgentResult::Fallback(f(doc)),
        }
    }
}

/// 由 AgentSpec 特化出的可调用 Agent
pub struct SchemaAgent<S: AgentSpec> {
    spec: S,
    client: Arc<dyn ReasoningClient>,
    activity: ActivityLog,
    schema_hint: String,
}

impl<S: AgentSpec> SchemaAgent<S> {
    pub fn new(spec: S, client: Arc<dyn ReasoningClient>, activity: ActivityLog) -> Self {
        Self {
            spec,
            client,
            activity,
            schema_hint: schema_hint::<S::Output>(),
        }
    }

    pub fn name(&self) -> &'static str {
        S::NAME
    }

    pub fn role(&self) -> &'static str {
        S::ROLE
    }

    pub fn schema_hint(&self) -> &str {
        &self.schema_hint
    }

    /// 兜底结果（不调用后端），便于调用方或测试直接取用
    pub fn fallback(&self, input: &S::Input) -> S::Output {
        self.spec.fallback(input)
    }

    pub async fn invoke(&self, input: &S::Input) -> AgentResult<S::Output> {
        self.activity.record(S::NAME, S::ROLE, self.spec.action(input));

        let prompt = self.spec.prompt(input);
        let outcome = match self.client.generate(&prompt, Some(&self.schema_hint)).await {
            Ok(raw) => {
                tracing::debug!(agent = S::NAME, raw = %raw, "backend output");
                parse_document::<S::Output>(&raw).and_then(|doc| {
                    self.spec
                        .check(input, &doc)
                        .map(|_| doc)
                        .map_err(ClientFailure::Malformed)
                })
            }
            Err(failure) => Err(failure),
        };

        match outcome {
            Ok(doc) => AgentResult::Generated(doc),
            Err(failure) => {
                tracing::warn!(agent = S::NAME, reason = %failure, "reasoning backend failed, serving fallback");
                self.activity.record(
                    S::NAME,
                    S::ROLE,
                    format!("Serving fallback ({})", failure.reason()),
                );
                AgentResult::Fallback(self.spec.fallback(input))
            }
        }
    }
}

/// 输出类型的 JSON Schema 字符串，拼入 prompt
pub fn schema_hint<T: JsonSchema>() -> String {
    let schema = schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").ok())
        .as_ref()
}

/// 剥离 markdown 代码块；没有代码块时截取首个 `{`/`[` 到最后一个 `}`/`]`
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(inner) = fence_regex()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
    {
        return inner.as_str().trim();
    }

    // 未闭合的代码块：去掉开头的 ```json
    let trimmed = match trimmed.strip_prefix("```") {
        Some(rest) => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim(),
        None => trimmed,
    };

    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    match (start, end) {
        (Some(s), Some(e)) if s < e => &trimmed[s..=e],
        _ => trimmed,
    }
}

/// 清洗、解析并校验后端输出；任何失败都归为 ClientFailure::Malformed
pub fn parse_document<T>(raw: &str) -> Result<T, ClientFailure>
where
    T: DeserializeOwned + Validate,
{
    let json_str = strip_code_fence(raw);
    let doc: T = serde_json::from_str(json_str)
        .map_err(|e| ClientFailure::Malformed(format!("{}: {}", e, json_str)))?;
    doc.validate().map_err(ClientFailure::Malformed)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockReasoningClient;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
    struct Score {
        score: f64,
    }

    impl Validate for Score {
        fn validate(&self) -> Result<(), String> {
            if (0.0..=1.0).contains(&self.score) {
                Ok(())
            } else {
                Err(format!("score out of range: {}", self.score))
            }
        }
    }

    struct ScoreSpec;

    impl AgentSpec for ScoreSpec {
        type Input = String;
        type Output = Score;
        const NAME: &'static str = "Scorer";
        const ROLE: &'static str = "Tester";

        fn action(&self, input: &String) -> String {
            format!("Scoring {input}")
        }

        fn prompt(&self, input: &String) -> String {
            format!("Score this: {input}")
        }

        fn fallback(&self, _input: &String) -> Score {
            Score { score: 0.5 }
        }
    }

    fn agent(mock: Arc<MockReasoningClient>) -> (SchemaAgent<ScoreSpec>, ActivityLog) {
        let log = ActivityLog::new();
        (SchemaAgent::new(ScoreSpec, mock, log.clone()), log)
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1,2]\n```"), "[1,2]");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("Sure! {\"a\":1} Hope it helps."), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("no json here"), "no json here");
    }

    #[test]
    fn test_parse_document_validates() {
        let ok: Score = parse_document("```json\n{\"score\": 0.9}\n```").unwrap();
        assert_eq!(ok.score, 0.9);

        let out_of_range = parse_document::<Score>("{\"score\": 1.9}");
        assert!(matches!(out_of_range, Err(ClientFailure::Malformed(_))));

        let missing = parse_document::<Score>("{\"other\": 1}");
        assert!(matches!(missing, Err(ClientFailure::Malformed(_))));
    }

    #[test]
    fn test_schema_hint_names_fields() {
        let hint = schema_hint::<Score>();
        assert!(hint.contains("score"));
    }

    #[tokio::test]
    async fn test_invoke_generated() {
        let mock = Arc::new(MockReasoningClient::with_responses(["```json\n{\"score\": 0.8}\n```"]));
        let (agent, log) = agent(mock.clone());

        let result = agent.invoke(&"ad copy".to_string()).await;
        assert_eq!(result, AgentResult::Generated(Score { score: 0.8 }));
        assert_eq!(log.len(), 1);
        assert!(mock.prompts()[0].contains("Score this: ad copy"));
    }

    #[tokio::test]
    async fn test_invoke_falls_back_on_failure_and_bad_output() {
        let mock = Arc::new(MockReasoningClient::with_responses(["not json at all"]));
        let (agent, log) = agent(mock);

        // 第一次：输出无法解析
        let bad = agent.invoke(&"x".to_string()).await;
        assert_eq!(bad, AgentResult::Fallback(Score { score: 0.5 }));
        // 第二次：队列耗尽，后端不可用
        let down = agent.invoke(&"y".to_string()).await;
        assert!(down.is_fallback());
        assert_eq!(down.into_inner().score, 0.5);

        // 每次调用一条动作 + 一条兜底
        assert_eq!(log.len(), 4);
        assert!(log.entries()[1].action.starts_with("Serving fallback"));
    }

    #[test]
    fn test_agent_result_map() {
        let r = AgentResult::Fallback(2).map(|v| v * 10);
        assert_eq!(r, AgentResult::Fallback(20));
        assert_eq!(*AgentResult::Generated("a").document(), "a");
    }
}
