//! Deterministic stand-ins for the mail adapter and the generator, used when
//! no credentials are configured. Same shapes and rules as the live path.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::generator::time_range;
use crate::models::{Brief, Headline, Message, Stats, Tip, Tool};
use crate::urls::clean_url;

/// Fixed newsletter set: two recent messages and one old enough to fall out
/// of the recency window.
pub fn recent_newsletters(now: DateTime<Utc>) -> Vec<Message> {
    vec![
        Message {
            id: "mock1".to_string(),
            from: "AI News Weekly <contact@ainews.com>".to_string(),
            subject: "AI Weekly: Generative AI's New Milestone".to_string(),
            date: now,
            body: "<h1>Top Story: Generative AI Reaches New Milestone</h1>\n\
                   <p>A new model has demonstrated the ability to write complex, production-ready \
                   software with minimal human intervention. Read more at \
                   https://www.example.com/news/gen-ai-milestone?utm_source=newsletter&utm_campaign=weekly_digest</p>\n\
                   <h2>New Tool Alert: DataScribe v2.0</h2>\n\
                   <p>Check out DataScribe, an AI-powered tool that automatically cleans and labels \
                   datasets. Find it here: https://www.example.com/tools/datascribe</p>"
                .to_string(),
        },
        Message {
            id: "mock2".to_string(),
            from: "The Neuron <editor@theneurondaily.com>".to_string(),
            subject: "The Neuron: Ethical Frameworks & Prompting Tips".to_string(),
            date: now - Duration::days(1),
            body: "<h2>Global Consortium Proposes Ethical AI Frameworks</h2>\n\
                   <p>A new set of guidelines for responsible AI development has been released. \
                   More info: https://www.example.com/news/ethical-ai-framework</p>\n\
                   <h3>Pro Tip: Optimizing Prompts for JSON Output</h3>\n\
                   <p>Learn how to structure your prompts to get reliable JSON from language \
                   models. Details: https://www.example.com/tips/json-prompts</p>"
                .to_string(),
        },
        Message {
            id: "mock3".to_string(),
            from: "AI News Weekly <contact@ainews.com>".to_string(),
            subject: "[ARCHIVED] The State of AI in 2023".to_string(),
            date: now - Duration::days(3),
            body: "<h1>This is an older email that the two-day window filters out.</h1>".to_string(),
        },
    ]
}

/// Mock brief with fixed content; the quick stats are computed from the input
/// the same way the live generator computes them.
pub fn generate_brief(messages: &[Message]) -> Brief {
    let unique_sources = messages
        .iter()
        .map(|m| m.from.as_str())
        .collect::<HashSet<_>>()
        .len() as u32;

    Brief {
        top_headlines: vec![
            Headline {
                headline: "Generative AI Reaches New Milestone in Code Generation".to_string(),
                summary: "A new model has demonstrated the ability to write complex, \
                          production-ready software with minimal human intervention."
                    .to_string(),
                why_it_matters: "This breakthrough could dramatically accelerate software \
                                 development cycles and change the role of developers."
                    .to_string(),
                url: clean_url("https://www.example.com/news/gen-ai-milestone?utm_source=newsletter"),
            },
            Headline {
                headline: "Ethical AI Frameworks Proposed by International Consortium".to_string(),
                summary: "A global group of researchers and policymakers have released a new set \
                          of guidelines for the responsible development of AI."
                    .to_string(),
                why_it_matters: "Standardized ethical guidelines are crucial for building public \
                                 trust and ensuring AI is developed safely."
                    .to_string(),
                url: clean_url("https://www.example.com/news/ethical-ai-framework"),
            },
        ],
        tools_to_try: vec![Tool {
            name: "DataScribe v2.0".to_string(),
            description: "An AI-powered tool that automatically cleans, labels, and documents \
                          datasets, saving data scientists hours of manual work."
                .to_string(),
            url: clean_url("https://www.example.com/tools/datascribe"),
        }],
        tips_to_try: vec![Tip {
            name: "Optimizing Prompts for JSON Output".to_string(),
            description: "Structure your prompts with clear examples and specify the desired \
                          schema to improve the reliability of JSON-based AI responses."
                .to_string(),
            url: clean_url("https://www.example.com/tips/json-prompts"),
        }],
        quick_stats: Stats {
            newsletters_scanned: messages.len() as u32,
            unique_sources,
            time_range: time_range(messages),
        },
    }
}
