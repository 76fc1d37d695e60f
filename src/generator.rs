//! Brief generation against the Gemini generative-language API

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::{BriefError, Result};
use crate::models::{Brief, Message};
use crate::urls::clean_url;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-2.5-flash";

const SYSTEM_INSTRUCTION: &str = "You are an expert analyst specializing in AI. Your task is to read AI newsletters and synthesize them into a concise 'Daily AI Brief'.
- Analyze the content to identify key information.
- Extract top headlines, new tools, actionable tips or techniques, and calculate summary statistics.
- For statistics, you MUST calculate the total number of newsletters scanned and the count of unique sources based on the 'From' field.
- Before providing any URL, you MUST strip all tracking parameters (like utm_*, fbclid, etc.).
- Adhere strictly to the provided JSON schema for your output. Do not output any text outside the JSON structure.
- If a section has no content, return an empty array for it.";

/// Response schema sent with every generation request. Sections the model
/// finds nothing for come back as empty arrays rather than being omitted.
static BRIEF_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "top_headlines": {
                "type": "ARRAY",
                "description": "A list of the top 3-5 news headlines.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "headline": { "type": "STRING", "description": "The main headline of the news." },
                        "summary": { "type": "STRING", "description": "A concise, one-sentence summary of the news." },
                        "why_it_matters": { "type": "STRING", "description": "Why this news is important, 20 words or fewer." },
                        "url": { "type": "STRING", "description": "The canonical source URL for the article." }
                    },
                    "required": ["headline", "summary", "why_it_matters", "url"]
                }
            },
            "tools_to_try": {
                "type": "ARRAY",
                "description": "A list of new or trending AI tools mentioned.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "The name of the tool." },
                        "description": { "type": "STRING", "description": "A one-sentence description of what the tool does and why it is trending." },
                        "url": { "type": "STRING", "description": "The homepage or article URL for the tool." }
                    },
                    "required": ["name", "description", "url"]
                }
            },
            "tips_to_try": {
                "type": "ARRAY",
                "description": "A list of actionable tips or techniques mentioned.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "A short title for the tip." },
                        "description": { "type": "STRING", "description": "A one-sentence description of the tip or technique." },
                        "url": { "type": "STRING", "description": "A source URL for the tip." }
                    },
                    "required": ["name", "description", "url"]
                }
            },
            "quick_stats": {
                "type": "OBJECT",
                "description": "Statistics about the scanned newsletters.",
                "properties": {
                    "newsletters_scanned": { "type": "INTEGER", "description": "Total number of newsletters processed." },
                    "unique_sources": { "type": "INTEGER", "description": "Count of unique newsletter sources (senders)." }
                },
                "required": ["newsletters_scanned", "unique_sources"]
            }
        },
        "required": ["top_headlines", "tools_to_try", "tips_to_try", "quick_stats"]
    })
});

/// Render messages into the single text block the model reads. Each message
/// is framed by a header and footer line carrying its 1-based index.
pub(crate) fn format_for_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            format!(
                "--- EMAIL {index} | From: {} | Date: {} ---\n\n{}\n\n--- END EMAIL {index} ---",
                message.from,
                message.date.to_rfc3339(),
                message.body,
                index = i + 1,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Span of days covered by a message set, computed locally rather than
/// trusted from the model.
pub fn time_range(messages: &[Message]) -> String {
    let mut dates = messages.iter().map(|m| m.date);
    let Some(first) = dates.next() else {
        return "N/A".to_string();
    };

    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    let earliest = min.format("%Y-%m-%d").to_string();
    let latest = max.format("%Y-%m-%d").to_string();

    if earliest == latest {
        earliest
    } else {
        format!("{} to {}", earliest, latest)
    }
}

/// Client for the structured-generation call.
pub struct GeminiGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, GEMINI_API_BASE)
    }

    /// Point the generator at a different base URL; tests run it against a
    /// local mock server.
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: GEMINI_MODEL.to_string(),
        }
    }

    /// Turn a set of messages into a [`Brief`].
    pub async fn generate(&self, messages: &[Message], api_key: &str) -> Result<Brief> {
        if api_key.is_empty() {
            return Err(BriefError::Config(
                "Gemini API key is not provided".to_string(),
            ));
        }

        let range = time_range(messages);
        let content = format_for_prompt(messages);
        debug!(
            "Requesting brief for {} messages spanning {}",
            messages.len(),
            range
        );

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let payload = json!({
            "contents": [{ "parts": [{ "text": content }] }],
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": &*BRIEF_SCHEMA,
            },
        });

        let response_text = match self.call(&url, &payload).await {
            Ok(text) => text,
            Err(detail) => {
                error!("Generation request failed: {}", detail);
                return Err(BriefError::GenerationFailed(detail));
            }
        };

        let mut brief: Brief = match serde_json::from_str(response_text.trim()) {
            Ok(brief) => brief,
            Err(e) => {
                error!("Generation response did not match the schema: {}", e);
                return Err(BriefError::GenerationFailed(e.to_string()));
            }
        };

        brief.quick_stats.time_range = range;
        clean_brief_urls(&mut brief);
        Ok(brief)
    }

    async fn call(&self, url: &str, payload: &Value) -> std::result::Result<String, String> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!(
                "generation service returned HTTP {}",
                response.status()
            ));
        }

        let body: Value = response.json().await.map_err(|e| e.to_string())?;
        body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "generation response carried no text content".to_string())
    }
}

/// The model is instructed to strip trackers; normalize again anyway.
fn clean_brief_urls(brief: &mut Brief) {
    for headline in &mut brief.top_headlines {
        headline.url = clean_url(&headline.url);
    }
    for tool in &mut brief.tools_to_try {
        tool.url = clean_url(&tool.url);
    }
    for tip in &mut brief.tips_to_try {
        tip.url = clean_url(&tip.url);
    }
}
