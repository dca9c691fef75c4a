use anyhow::bail;
use async_trait::async_trait;
use reqwest;
use serde_json::json;

use crate::models::ledger::StructuredPurchase;

const SYSTEM_PROMPT: &str = "You are a restaurant data-entry assistant. Analyze the text and \
identify the product, the category (food or beverage), the value (number only) and the date \
(YYYY-MM-DD format, use today's date if none is mentioned). Return exactly the requested JSON \
schema.";

/// Boundary to the speech structuring model. `Ok(None)` means the model could
/// not make sense of the transcript; `Err` means the call itself failed.
#[async_trait]
pub trait VoiceExtractor: Send + Sync + 'static {
    async fn extract(&self, transcript: &str)
        -> Result<Option<StructuredPurchase>, anyhow::Error>;
}

pub struct GeminiExtractor {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiExtractor {
    pub fn new(url: String, api_key: String, model: String) -> Self {
        Self {
            url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl VoiceExtractor for GeminiExtractor {
    async fn extract(
        &self,
        transcript: &str,
    ) -> Result<Option<StructuredPurchase>, anyhow::Error> {
        let payload = json!({
            "system_instruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
            "contents": [{
                "parts": [{
                    "text": format!(
                        "Extract the restaurant purchase information from this text: \"{}\". Return JSON.",
                        transcript
                    )
                }]
            }],
            "generationConfig": {
                "response_mime_type": "application/json",
                "response_schema": {
                    "type": "OBJECT",
                    "properties": {
                        "product": { "type": "STRING" },
                        "category": { "type": "STRING", "enum": ["food", "beverage"] },
                        "value": { "type": "NUMBER" },
                        "date": { "type": "STRING" }
                    },
                    "required": ["product", "category", "value", "date"]
                }
            }
        });

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?
            .text()
            .await?;

        let response_json: serde_json::Value = serde_json::from_str(&response)?;
        let text = response_json["candidates"][0]["content"]["parts"][0]["text"].as_str();

        match text {
            Some(text) => match serde_json::from_str::<StructuredPurchase>(text) {
                Ok(purchase) => Ok(Some(purchase)),
                // The model answered but not with a usable record.
                Err(_) => Ok(None),
            },
            None => bail!("Gemini: bad response format."),
        }
    }
}
