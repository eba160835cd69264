//! Prompt construction for the language-model collaborator.
//!
//! Prompts open with speaker statistics computed from the packed context —
//! participant count and the most active authors — so the model knows who
//! is talking before it summarizes or mimics anyone.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// `author:` at the start of a context line.
static SPEAKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?): ").expect("speaker regex"));

/// Relevance annotation prefixed onto semantic context parts.
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[Relevance: [0-9.]+\] ").expect("annotation regex"));

/// Speaker statistics over a packed context string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeakerStats {
    /// Number of distinct authors seen.
    pub participant_count: usize,
    /// `"name (N msgs)"` entries for the most active authors, busiest first.
    pub top_speakers: Vec<String>,
}

impl SpeakerStats {
    /// Compute stats from a packed context string.
    pub fn from_context(context: &str) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for line in context.lines() {
            // Relevance annotations prefix the first author of a semantic
            // part; strip them before matching the author.
            let line = ANNOTATION_RE.replace(line, "");
            if let Some(capture) = SPEAKER_RE.captures(&line) {
                let name = capture[1].trim().to_owned();
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        let participant_count = counts.len();

        let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let top_speakers = ordered
            .into_iter()
            .take(5)
            .map(|(name, count)| format!("{name} ({count} msgs)"))
            .collect();

        Self {
            participant_count,
            top_speakers,
        }
    }

    fn headline(&self) -> String {
        format!(
            "There are {} participants, mainly {}.\n",
            self.participant_count,
            self.top_speakers.join(", ")
        )
    }
}

/// System prompt for summarization, optionally focused on a query.
pub fn summary_prompt(stats: &SpeakerStats, query: Option<&str>) -> String {
    let mut prompt = String::from("You are a professional conversation summarizer.\n");
    prompt.push_str(&stats.headline());
    match query {
        Some(q) => {
            prompt.push_str(&format!(
                "Focus your summary on content related to: '{q}'.\n\
                 Summarize the conversation:\n\
                 - Mention key points made related to the focus topic.\n\
                 - Highlight important statements relevant to the query.\n\
                 Be detailed and faithful to the tone.\n"
            ));
        }
        None => {
            prompt.push_str(
                "Summarize the conversation:\n\
                 - Mention key points made.\n\
                 - Highlight important statements.\n\
                 Be detailed and faithful to the tone.\n",
            );
        }
    }
    prompt
}

/// System prompt for drafting a reply, optionally mimicking one author.
pub fn draft_prompt(stats: &SpeakerStats, as_author: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an expert at paraphrasing messages while maintaining a \
         specific user's writing style.\n",
    );
    prompt.push_str(&stats.headline());
    match as_author {
        Some(author) => {
            prompt.push_str(&format!(
                "Rephrase the user's input message AS IF IT WAS WRITTEN BY {author}.\n\
                 Analyze {author}'s writing style from the conversation history and mimic it.\n\
                 Keep the same meaning and intent as the original message.\n"
            ));
        }
        None => {
            prompt.push_str(
                "Draft a reply that fits naturally into the conversation.\n\
                 Keep the same meaning and intent as the original message.\n",
            );
        }
    }
    prompt
}

/// System prompt for validating regex-extracted key information.
pub fn key_info_refinement_prompt(key_info: &str) -> String {
    format!(
        "You are an expert in extracting and validating notification-style information.\n\
         Below is a list of candidate key items extracted from a conversation:\n\
         {key_info}\n\n\
         Verify, correct, and clarify each item. Output final bullet points.\n"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
