//! Comparison engine for webhook vs policy validation outcomes.
//!
//! Decides whether two [`ValidationResult`]s for the same scenario are
//! equivalent and explains any gap. The decision mismatch is the
//! dominant signal; message drift and latency drift degrade the
//! equivalence score with smaller weights.

use std::collections::HashMap;

use jiff::SignedDuration;

use crate::validator::ValidationResult;

/// Minimum word-multiset similarity required between two denial
/// messages before they count as drifted.
const MESSAGE_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Latency drift tolerance applied in strict mode, in milliseconds.
const LATENCY_TOLERANCE_MS: i64 = 50;

/// Outcome of comparing one webhook result against one policy result.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// True iff no discrepancy was detected under the configured
    /// strictness. Latency drift never flips this; see `compare`.
    pub matched: bool,
    /// Human-readable discrepancy descriptions, in check order.
    pub differences: Vec<String>,
    /// Policy latency minus webhook latency.
    pub latency_delta: SignedDuration,
    /// Weighted equivalence measure in [0, 1]; 1.0 means identical
    /// decision and message.
    pub equivalence_score: f64,
    /// Remediation notes derived from the differences.
    pub recommendations: Vec<String>,
}

/// Compares webhook and policy validation results.
pub struct ComparisonEngine {
    strict_mode: bool,
}

impl ComparisonEngine {
    /// In strict mode, latency drift beyond the tolerance is recorded
    /// as a difference (without affecting the match verdict).
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Compare two results produced for the same scenario invocation.
    ///
    /// Never errors: any pair of completed results yields a
    /// `ComparisonResult`, even a maximally penalized one. Callers must
    /// not feed in a partial pair; an errored adapter call has no
    /// result to compare.
    pub fn compare(
        &self,
        webhook: &ValidationResult,
        policy: &ValidationResult,
    ) -> ComparisonResult {
        let latency_delta = signed_delta(policy.latency, webhook.latency);
        let mut matched = true;
        let mut differences = Vec::new();

        let decision_mismatch = webhook.allowed != policy.allowed;
        if decision_mismatch {
            matched = false;
            differences.push(format!(
                "Allowed status mismatch: webhook={}, policy={}",
                webhook.allowed, policy.allowed
            ));
        }

        // Message text only matters when both paths denied.
        if !webhook.allowed && !policy.allowed {
            let similarity =
                message_similarity(&webhook.error_message, &policy.error_message);
            if similarity < MESSAGE_SIMILARITY_THRESHOLD {
                matched = false;
                differences.push(format!(
                    "Error message similarity too low: {:.2} (threshold: {:.2}); webhook: {}; policy: {}",
                    similarity,
                    MESSAGE_SIMILARITY_THRESHOLD,
                    webhook.error_message,
                    policy.error_message
                ));
            }
        }

        // Latency drift is advisory: recorded in strict mode, never a
        // correctness failure.
        if self.strict_mode && latency_delta.abs() > SignedDuration::from_millis(LATENCY_TOLERANCE_MS)
        {
            differences.push(format!(
                "Latency difference too high: {}ms (threshold: {}ms)",
                latency_delta.as_millis(),
                LATENCY_TOLERANCE_MS
            ));
        }

        let equivalence_score = equivalence_score(decision_mismatch, &differences);
        let recommendations = recommendations(&differences);

        ComparisonResult {
            matched,
            differences,
            latency_delta,
            equivalence_score,
            recommendations,
        }
    }
}

fn signed_delta(candidate: std::time::Duration, reference: std::time::Duration) -> SignedDuration {
    SignedDuration::from_nanos(candidate.as_nanos() as i64 - reference.as_nanos() as i64)
}

/// Weighted equivalence score.
///
/// Starts at 1.0. A decision mismatch costs a flat 0.5; every other
/// difference costs 0.2 (message similarity), 0.1 (latency), or 0.15
/// (anything else). Clamped at 0.0.
fn equivalence_score(decision_mismatch: bool, differences: &[String]) -> f64 {
    let mut score: f64 = 1.0;

    if decision_mismatch {
        score -= 0.5;
    }

    for difference in differences {
        if difference.contains("Allowed status mismatch") {
            continue;
        }
        if difference.contains("message similarity") {
            score -= 0.2;
        } else if difference.contains("Latency") {
            score -= 0.1;
        } else {
            score -= 0.15;
        }
    }

    score.max(0.0)
}

/// Pattern-based remediation notes for the recorded differences.
fn recommendations(differences: &[String]) -> Vec<String> {
    let mut recommendations = Vec::new();

    for difference in differences {
        if difference.contains("Allowed status mismatch") {
            recommendations.push(
                "Critical: review the policy expressions; the decision disagrees with the webhook"
                    .to_string(),
            );
        } else if difference.contains("message similarity") {
            recommendations.push(
                "Review the policy message expressions to match the webhook error text more closely"
                    .to_string(),
            );
        } else if difference.contains("Latency") {
            recommendations.push(
                "Performance: consider optimizing policy expressions for better evaluation latency"
                    .to_string(),
            );
        }
    }

    if recommendations.is_empty() {
        recommendations.push("Validation results are equivalent - good to proceed!".to_string());
    }

    recommendations
}

/// Approximate Jaccard similarity over word multisets.
///
/// Duplicate words are matched at most as many times as they occur in
/// the first message, and they inflate the union denominator. The 0.8
/// threshold was tuned against this exact arithmetic; do not swap in a
/// set-based Jaccard.
pub fn message_similarity(first: &str, second: &str) -> f64 {
    if first == second {
        return 1.0;
    }

    let first = first.to_lowercase();
    let second = second.to_lowercase();
    let first_words: Vec<&str> = first.split_whitespace().collect();
    let second_words: Vec<&str> = second.split_whitespace().collect();

    if first_words.is_empty() && second_words.is_empty() {
        return 1.0;
    }
    if first_words.is_empty() || second_words.is_empty() {
        return 0.0;
    }

    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for word in &first_words {
        *remaining.entry(word).or_insert(0) += 1;
    }

    let mut common = 0usize;
    for word in &second_words {
        if let Some(count) = remaining.get_mut(word) {
            if *count > 0 {
                common += 1;
                *count -= 1;
            }
        }
    }

    let union = first_words.len() + second_words.len() - common;
    if union == 0 {
        return 1.0;
    }

    common as f64 / union as f64
}
