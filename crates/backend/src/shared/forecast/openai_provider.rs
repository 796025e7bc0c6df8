use super::types::{ForecastError, ForecastInput, SalesForecastProvider};
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use contracts::shared::kpi::SalesForecast;
use serde::Deserialize;

const SYSTEM_PROMPT: &str = "You are a sales forecasting assistant for a chain of gyms. \
Gyms are closed on Sundays; Saturdays and holidays run at roughly half the usual sales volume. \
Given recent daily revenues and the weighted month progress, project the total revenue for the \
whole month. Respond with a single JSON object {\"forecast\": number, \"reasoning\": string} \
where reasoning is one sentence.";

/// OpenAI-backed forecast provider
pub struct OpenAiForecastProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiForecastProvider {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self { client, model }
    }

    /// Create with a custom endpoint (for compatible APIs)
    pub fn new_with_endpoint(api_endpoint: String, api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_endpoint);
        let client = Client::with_config(config);

        Self { client, model }
    }

    fn build_user_prompt(input: &ForecastInput) -> String {
        let history = input
            .recent_daily_revenues
            .iter()
            .map(|v| format!("{:.2}", v))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Recent daily revenues (most recent first): [{}]. \
             Revenue so far this month: {:.2}. \
             Month has {} days, {} elapsed. \
             Effective business days elapsed: {:.1}, remaining: {:.1}.",
            history,
            input.current_month_revenue,
            input.progress.total_days,
            input.progress.elapsed_days,
            input.progress.effective_past,
            input.progress.effective_remaining,
        )
    }
}

/// Payload the model is instructed to return
#[derive(Debug, Deserialize)]
struct ForecastPayload {
    forecast: f64,
    reasoning: String,
}

/// Extract the JSON object from the model output, tolerating code fences and
/// prose around it.
fn parse_forecast_content(content: &str) -> Result<SalesForecast, ForecastError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if e > s => &content[s..=e],
        _ => {
            return Err(ForecastError::InvalidResponse(format!(
                "no JSON object in provider output: {}",
                content
            )))
        }
    };

    let payload: ForecastPayload = serde_json::from_str(json)
        .map_err(|e| ForecastError::InvalidResponse(e.to_string()))?;

    if !payload.forecast.is_finite() || payload.forecast < 0.0 {
        return Err(ForecastError::InvalidResponse(format!(
            "forecast out of range: {}",
            payload.forecast
        )));
    }

    Ok(SalesForecast {
        forecast: payload.forecast,
        reasoning: payload.reasoning,
    })
}

#[async_trait]
impl SalesForecastProvider for OpenAiForecastProvider {
    async fn project_month_total(
        &self,
        input: &ForecastInput,
    ) -> Result<SalesForecast, ForecastError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(|e| ForecastError::ApiError(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(Self::build_user_prompt(input))
            .build()
            .map_err(|e| ForecastError::ApiError(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([system.into(), user.into()])
            .build()
            .map_err(|e| ForecastError::ApiError(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("401") || err_str.contains("authentication") {
                ForecastError::AuthError(err_str)
            } else if err_str.contains("429") || err_str.contains("rate limit") {
                ForecastError::RateLimitExceeded
            } else {
                ForecastError::ApiError(err_str)
            }
        })?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| ForecastError::ApiError("No response from API".to_string()))?;

        let content = choice.message.content.clone().unwrap_or_default();
        parse_forecast_content(&content)
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}
