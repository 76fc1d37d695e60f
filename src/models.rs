use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One retrieved mail item reduced to sender, subject, timestamp, and decoded
/// body. Built by the mail adapter from raw transport data; immutable after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub date: DateTime<Utc>,
    pub body: String,
}

/// A top news item in the brief.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Headline {
    pub headline: String,
    pub summary: String,
    pub why_it_matters: String,
    pub url: String,
}

/// A tool surfaced by the newsletters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Structurally identical to [`Tool`], kept separate because the brief treats
/// tips as a distinct section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tip {
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Summary statistics for one run. `time_range` is computed locally and
/// filled in after the generation response is parsed, hence the default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub newsletters_scanned: u32,
    pub unique_sources: u32,
    #[serde(default)]
    pub time_range: String,
}

/// The structured output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Brief {
    pub top_headlines: Vec<Headline>,
    pub tools_to_try: Vec<Tool>,
    pub tips_to_try: Vec<Tip>,
    pub quick_stats: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization_roundtrip() {
        let message = Message {
            id: "m1".to_string(),
            from: "AI News <news@example.com>".to_string(),
            subject: "Weekly AI digest".to_string(),
            date: Utc::now(),
            body: "Hello".to_string(),
        };

        let json = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(message, deserialized);
    }

    #[test]
    fn test_stats_time_range_defaults_when_absent() {
        // The generation service is only asked for the two counts; time_range
        // arrives later from the local computation.
        let stats: Stats =
            serde_json::from_str(r#"{"newsletters_scanned": 3, "unique_sources": 2}"#).unwrap();
        assert_eq!(stats.newsletters_scanned, 3);
        assert_eq!(stats.unique_sources, 2);
        assert_eq!(stats.time_range, "");
    }

    #[test]
    fn test_brief_parses_schema_shaped_json() {
        let json = r#"{
            "top_headlines": [
                {"headline": "H", "summary": "S", "why_it_matters": "W", "url": "https://example.com"}
            ],
            "tools_to_try": [],
            "tips_to_try": [],
            "quick_stats": {"newsletters_scanned": 1, "unique_sources": 1}
        }"#;

        let brief: Brief = serde_json::from_str(json).unwrap();
        assert_eq!(brief.top_headlines.len(), 1);
        assert!(brief.tools_to_try.is_empty());
        assert!(brief.tips_to_try.is_empty());
    }
}
