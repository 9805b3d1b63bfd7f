// Scripted FAQ assistant: ordered keyword rules, first match wins. No network.

use std::sync::LazyLock;
use std::time::Duration;

use rand::Rng;
use regex::Regex;

pub const GREETING: &str = "Hi! I'm your EcoWaste assistant. 🌱 Ask me about recycling, e-waste categories, or our services! I'm here to help you recycle responsibly.";

pub const QUICK_SUGGESTIONS: [&str; 6] = [
    "What can I recycle?",
    "Schedule a pickup",
    "Data security info",
    "Battery recycling",
    "Environmental benefits",
    "Cost and pricing",
];

const THINKING_MIN_MS: u64 = 800;
const THINKING_MAX_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Devices,
    Pickup,
    DataSecurity,
    Batteries,
    Environment,
    Pricing,
    Preparation,
    Process,
    Business,
    Thanks,
}

impl Topic {
    pub fn answer(self) -> &'static str {
        let text = match self {
            Topic::Greeting => include_str!("answers/greeting.md"),
            Topic::Devices => include_str!("answers/devices.md"),
            Topic::Pickup => include_str!("answers/pickup.md"),
            Topic::DataSecurity => include_str!("answers/data_security.md"),
            Topic::Batteries => include_str!("answers/batteries.md"),
            Topic::Environment => include_str!("answers/environment.md"),
            Topic::Pricing => include_str!("answers/pricing.md"),
            Topic::Preparation => include_str!("answers/preparation.md"),
            Topic::Process => include_str!("answers/process.md"),
            Topic::Business => include_str!("answers/business.md"),
            Topic::Thanks => include_str!("answers/thanks.md"),
        };
        text.trim_end()
    }
}

/// Menu returned when no rule matches.
pub fn fallback_answer() -> &'static str {
    include_str!("answers/fallback.md").trim_end()
}

// Order is precedence: "how do I get ready" hits pickup before preparation.
static RULES: LazyLock<Vec<(Topic, Regex)>> = LazyLock::new(|| {
    [
        (Topic::Greeting, r"(hello|hi|hey|greetings|good morning|good afternoon)"),
        (Topic::Devices, r"(what.*recycle|recycle.*what|accept|take|which device)"),
        (Topic::Pickup, r"(pickup|schedule|collect|arrange|when.*come|how.*get)"),
        (Topic::DataSecurity, r"(data|privacy|security|wipe|erase|information|personal)"),
        (Topic::Batteries, r"(batter|power|charge|lithium|alkaline)"),
        (Topic::Environment, r"(environment|planet|earth|green|eco|sustainable|impact|benefit)"),
        (Topic::Pricing, r"(cost|price|free|charge|money|pay|fee)"),
        (Topic::Preparation, r"(prepare|ready|pack|package|how.*get ready)"),
        (Topic::Process, r"(process|what happens|after|next|where.*go)"),
        (Topic::Business, r"(business|company|office|commercial|enterprise|corporate)"),
        (Topic::Thanks, r"(thank|thanks|appreciate|grateful)"),
    ]
    .into_iter()
    .map(|(topic, pattern)| (topic, Regex::new(pattern).expect("valid assistant rule")))
    .collect()
});

/// First topic whose rule matches the lowercased, trimmed input.
pub fn classify(input: &str) -> Option<Topic> {
    let normalized = input.trim().to_lowercase();
    RULES
        .iter()
        .find(|(_, rule)| rule.is_match(&normalized))
        .map(|(topic, _)| *topic)
}

pub fn reply(input: &str) -> &'static str {
    classify(input).map_or_else(fallback_answer, Topic::answer)
}

/// Uniform pause before an answer appears.
pub fn thinking_delay() -> Duration {
    Duration::from_millis(rand::rng().random_range(THINKING_MIN_MS..=THINKING_MAX_MS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatMessage {
    fn assistant(text: &str) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.to_string(),
        }
    }
}

/// In-memory transcript of one widget session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(GREETING)],
        }
    }
}

impl ChatSession {
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Appends the user's text and, after the thinking pause, the answer.
    /// Blank input is ignored and yields `None`.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        self.transcript.push(ChatMessage {
            speaker: Speaker::User,
            text: input.to_string(),
        });

        tokio::time::sleep(thinking_delay()).await;

        let answer = reply(input);
        tracing::debug!(topic = ?classify(input), "assistant answered.");
        self.transcript.push(ChatMessage::assistant(answer));
        self.transcript.last()
    }

    pub fn reset(&mut self) {
        self.transcript = vec![ChatMessage::assistant(GREETING)];
    }
}
