#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The model that reads a submission and answers with a score.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use reqwest::Client;

use crate::config::{GraderConfig, OpenAiEnv, RetryPolicy};

/// An enum to represent possible errors when asking the judge for a grade.
#[derive(thiserror::Error, Debug)]
pub enum JudgeError {
    /// The judge did not answer in time.
    #[error("The judge did not answer within {0:?}")]
    Timeout(Duration),
    /// The API call failed.
    #[error("The judge request failed: {0}")]
    Api(#[from] OpenAIError),
    /// The judge answered with nothing.
    #[error("The judge returned an empty response")]
    EmptyResponse,
    /// Anything else, from judges that are not backed by OpenAI.
    #[error("{0}")]
    Other(String),
}

impl JudgeError {
    /// Whether trying again might help.
    pub fn is_retryable(&self) -> bool {
        match self {
            JudgeError::Timeout(_) | JudgeError::EmptyResponse => true,
            JudgeError::Api(OpenAIError::Reqwest(e)) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            JudgeError::Api(OpenAIError::ApiError(e)) => {
                let kind = e.r#type.as_deref().unwrap_or_default();
                kind.contains("server_error")
                    || kind.contains("rate_limit")
                    || e.message.to_ascii_lowercase().contains("rate limit")
            }
            JudgeError::Api(_) | JudgeError::Other(_) => false,
        }
    }
}

/// Something that grades a submission given a system prompt and the
/// submission text, answering in free text.
pub trait Judge: Send + Sync {
    /// Asks for a grade. Implementations should not retry; callers do.
    fn judge(
        &self,
        system_prompt: &str,
        submission: &str,
    ) -> impl Future<Output = Result<String, JudgeError>> + Send;
}

/// A judge backed by any OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiJudge {
    /// API client
    client:      OpenAIClient<OpenAIConfig>,
    /// model identifier
    model:       String,
    /// sampling temperature, provider default when unset
    temperature: Option<f32>,
}

impl OpenAiJudge {
    /// Creates a judge reusing the given HTTP client.
    pub fn new(openai: &OpenAiEnv, http_client: Client) -> Self {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(openai.api_base().to_owned())
                .with_api_key(openai.api_key().to_owned()),
        )
        .with_http_client(http_client);

        Self {
            client,
            model: openai.model().to_owned(),
            temperature: openai.temperature(),
        }
    }

    /// Creates a judge from the grader configuration.
    pub fn from_config(config: &GraderConfig) -> Result<Self> {
        let openai = config.openai().ok_or_else(|| {
            anyhow!("OPENAI_API_KEY must be set (OPENAI_ENDPOINT and OPENAI_MODEL are optional)")
        })?;
        let http_client = Client::builder()
            .no_proxy()
            .build()
            .context("Failed to construct HTTP client for the judge")?;
        Ok(Self::new(openai, http_client))
    }

    /// Model identifier used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Judge for OpenAiJudge {
    async fn judge(&self, system_prompt: &str, submission: &str) -> Result<String, JudgeError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(submission)
                .build()?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.model.as_str()).messages(messages).n(1);
        if let Some(temperature) = self.temperature {
            request.temperature(temperature);
        }
        let response = self.client.chat().create(request.build()?).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(JudgeError::EmptyResponse)
    }
}

/// Calls the judge with a timeout per attempt, retrying transient failures
/// with exponential backoff.
pub async fn judge_with_retry<J: Judge>(
    judge: &J,
    system_prompt: &str,
    submission: &str,
    policy: RetryPolicy,
    timeout: Duration,
) -> Result<String, JudgeError> {
    let mut retries = 0;

    loop {
        let result = match tokio::time::timeout(timeout, judge.judge(system_prompt, submission)).await
        {
            Ok(result) => result,
            Err(_) => Err(JudgeError::Timeout(timeout)),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                let backoff = policy.backoff(retries);
                tracing::warn!(
                    error = %e,
                    retry = retries,
                    max_retries = policy.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying judge request"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
