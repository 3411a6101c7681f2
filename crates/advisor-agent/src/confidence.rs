// SPDX-FileCopyrightText: 2026 Advisor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confidence heuristics for generated replies.
//!
//! Two interchangeable strategies exist because the triage rules evolved
//! over time: [`WeightedScore`] produces a numeric score against a
//! threshold, [`PhraseLength`] is a boolean classifier with no score. Both
//! agree on the category: short replies, hedging language, and one-word
//! non-answers need a human.

use advisor_config::model::ConfidenceStrategy;

/// Hedging phrases that sharply lower confidence (case-insensitive).
const UNCERTAINTY_PHRASES: &[&str] = &[
    "i don't know",
    "i'm not sure",
    "i cannot",
    "i can't help",
    "i don't have",
    "i'm unable",
    "beyond my knowledge",
    "not able to",
    "cannot provide",
    "don't have information",
];

/// Visitor-message keywords that mark a commercially important question.
const HIGH_VALUE_KEYWORDS: &[&str] = &[
    "price",
    "cost",
    "subsidy",
    "schedule",
    "duration",
    "certificate",
    "location",
];

/// One-word acknowledgements that carry no information.
const GENERIC_ACKS: &[&str] = &["okay", "ok", "yes", "no", "maybe", "perhaps"];

const BASELINE: f64 = 0.8;
const UNCERTAIN_SCORE: f64 = 0.3;
const SHORT_PENALTY: f64 = 0.2;
const HIGH_VALUE_BONUS: f64 = 0.1;

/// Reply length below which [`PhraseLength`] flags a turn outright.
const PHRASE_LENGTH_MIN_CHARS: usize = 20;

/// Outcome of evaluating one turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Numeric score in [0, 1]; `None` for the boolean strategy.
    pub score: Option<f64>,
    pub needs_help: bool,
}

/// Judges whether a generated reply needs human follow-up.
pub trait ConfidenceEvaluator: Send + Sync {
    fn evaluate(&self, user_message: &str, reply: &str) -> Verdict;
}

/// Builds the evaluator selected in the chat config.
pub fn evaluator_for(
    strategy: ConfidenceStrategy,
    threshold: f64,
    min_reply_chars: usize,
) -> Box<dyn ConfidenceEvaluator> {
    match strategy {
        ConfidenceStrategy::Weighted => Box::new(WeightedScore {
            threshold,
            min_reply_chars,
        }),
        ConfidenceStrategy::PhraseLength => Box::new(PhraseLength),
    }
}

fn contains_uncertainty(reply_lower: &str) -> bool {
    UNCERTAINTY_PHRASES.iter().any(|p| reply_lower.contains(p))
}

/// Numeric strategy: baseline score adjusted by hedging, reply length, and
/// question value, then compared against a threshold.
pub struct WeightedScore {
    pub threshold: f64,
    pub min_reply_chars: usize,
}

impl ConfidenceEvaluator for WeightedScore {
    fn evaluate(&self, user_message: &str, reply: &str) -> Verdict {
        let reply_lower = reply.to_lowercase();
        let reply_len = reply.chars().count();

        let mut score = BASELINE;
        if contains_uncertainty(&reply_lower) {
            score = UNCERTAIN_SCORE;
        }
        if reply_len < self.min_reply_chars {
            score -= SHORT_PENALTY;
        }

        let message_lower = user_message.to_lowercase();
        let high_value = HIGH_VALUE_KEYWORDS.iter().any(|k| message_lower.contains(k));
        if high_value && reply_len >= self.min_reply_chars {
            score += HIGH_VALUE_BONUS;
        }

        let score = score.clamp(0.0, 1.0);
        Verdict {
            score: Some(score),
            needs_help: score < self.threshold,
        }
    }
}

/// Boolean strategy: hedging phrase, very short reply, or a one-word
/// generic acknowledgement.
pub struct PhraseLength;

impl ConfidenceEvaluator for PhraseLength {
    fn evaluate(&self, _user_message: &str, reply: &str) -> Verdict {
        let reply_lower = reply.to_lowercase();
        let trimmed = reply_lower.trim().trim_end_matches(['.', '!']);

        let needs_help = contains_uncertainty(&reply_lower)
            || reply.chars().count() < PHRASE_LENGTH_MIN_CHARS
            || GENERIC_ACKS.contains(&trimmed);

        Verdict {
            score: None,
            needs_help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted() -> WeightedScore {
        WeightedScore {
            threshold: 0.5,
            min_reply_chars: 40,
        }
    }

    #[test]
    fn i_dont_know_needs_help() {
        let verdict = weighted().evaluate("question", "I don't know");
        assert!(verdict.needs_help);
        // Uncertain phrase plus short reply: 0.3 - 0.2.
        assert_eq!(verdict.score, Some(0.3 - 0.2));

        assert!(PhraseLength.evaluate("question", "I don't know").needs_help);
    }

    #[test]
    fn confident_long_reply_passes() {
        let reply = "The evening course runs for twelve weeks and includes a final project \
                     reviewed by an industry mentor.";
        let verdict = weighted().evaluate("tell me about the course", reply);
        assert!(!verdict.needs_help);
        assert_eq!(verdict.score, Some(0.8));

        assert!(!PhraseLength.evaluate("tell me about the course", reply).needs_help);
    }

    #[test]
    fn uncertainty_is_case_insensitive() {
        let verdict = weighted().evaluate("q", "I'M NOT SURE about that, sorry for the trouble.");
        assert!(verdict.needs_help);
        assert_eq!(verdict.score, Some(0.3));
    }

    #[test]
    fn short_reply_penalty_applies_without_hedging() {
        let verdict = weighted().evaluate("q", "See our website.");
        // 0.8 - 0.2 = 0.6: flagged-adjacent but still above threshold.
        assert_eq!(verdict.score, Some(0.8 - 0.2));
        assert!(!verdict.needs_help);
    }

    #[test]
    fn high_value_question_with_substantial_reply_gets_bonus() {
        let reply = "The course price is 1200 and a subsidy of up to 70 percent is available \
                     for eligible applicants.";
        let verdict = weighted().evaluate("what is the price?", reply);
        assert_eq!(verdict.score, Some(0.8 + 0.1));

        // Bonus never applies to short replies.
        let short = weighted().evaluate("what is the price?", "It varies.");
        assert_eq!(short.score, Some(0.8 - 0.2));
    }

    #[test]
    fn score_is_clamped() {
        let evaluator = WeightedScore {
            threshold: 0.5,
            min_reply_chars: 200,
        };
        // Uncertain + short: 0.3 - 0.2 = 0.1, stays within [0, 1].
        let verdict = evaluator.evaluate("q", "I cannot");
        let score = verdict.score.unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn phrase_length_flags_generic_acks_and_short_replies() {
        assert!(PhraseLength.evaluate("q", "Okay.").needs_help);
        assert!(PhraseLength.evaluate("q", "maybe").needs_help);
        assert!(PhraseLength.evaluate("q", "short answer").needs_help);
        assert!(PhraseLength.evaluate("q", "").needs_help);
        assert!(PhraseLength.evaluate("q", "I cannot provide that information right now.").needs_help);
    }

    #[test]
    fn phrase_length_reports_no_score() {
        assert_eq!(PhraseLength.evaluate("q", "ok").score, None);
    }

    #[test]
    fn factory_selects_strategy() {
        let weighted = evaluator_for(ConfidenceStrategy::Weighted, 0.5, 40);
        assert!(weighted.evaluate("q", "hello there my friend").score.is_some());

        let boolean = evaluator_for(ConfidenceStrategy::PhraseLength, 0.5, 40);
        assert!(boolean.evaluate("q", "hello there my friend, how can I help today?").score.is_none());
    }
}
