//! Confidence aggregation, discrepancy detection, and the recommendation table.

use verdant_types::AgentResponse;

/// Penalty multiplier applied to the lowest confidence when verifiers disagree.
const DISAGREEMENT_FACTOR: f64 = 0.7;

/// Largest variance penalty [`calculate_confidence_score`] will apply.
const MAX_VARIANCE_PENALTY: f64 = 20.0;

/// Confidence spread above which agents are reported as disagreeing.
const MAX_CONFIDENCE_SPREAD: u8 = 30;

pub const HIGH_CONFIDENCE_RECOMMENDATION: &str =
    "Response verified through agent consensus with high confidence";
pub const MODERATE_CONFIDENCE_RECOMMENDATION: &str =
    "Response verified through agent consensus with moderate confidence";
pub const DISAGREEMENT_RECOMMENDATION_PREFIX: &str =
    "Human verification recommended due to agent disagreements: ";
pub const LOW_CONFIDENCE_RECOMMENDATION: &str =
    "Human verification recommended due to low confidence scores";
pub const REVIEW_DISAGREEMENT: &str = "Agents disagree on need for human verification";

/// Scores a set of responses: the mean confidence, less half the standard
/// deviation (at most 20 points), floored at 0 and rounded.
///
/// Returns 0 for an empty slice.
pub fn calculate_confidence_score(responses: &[AgentResponse]) -> u8 {
    if responses.is_empty() {
        return 0;
    }

    let n = responses.len() as f64;
    let average = responses.iter().map(|r| f64::from(r.confidence)).sum::<f64>() / n;
    let variance = responses
        .iter()
        .map(|r| (f64::from(r.confidence) - average).powi(2))
        .sum::<f64>()
        / n;
    let penalty = (variance.sqrt() / 2.0).min(MAX_VARIANCE_PENALTY);

    (average - penalty).max(0.0).round() as u8
}

type DiscrepancyCheck = fn(&[AgentResponse]) -> Option<String>;

/// Independent discrepancy checks, run in this order. Each contributes at
/// most one message.
const DISCREPANCY_CHECKS: &[DiscrepancyCheck] = &[confidence_spread, review_disagreement];

/// Lists the ways a set of responses disagree with one another.
///
/// Fewer than two responses never disagree.
pub fn detect_discrepancies(responses: &[AgentResponse]) -> Vec<String> {
    if responses.len() < 2 {
        return Vec::new();
    }
    DISCREPANCY_CHECKS
        .iter()
        .filter_map(|check| check(responses))
        .collect()
}

fn confidence_spread(responses: &[AgentResponse]) -> Option<String> {
    let min = responses.iter().map(|r| r.confidence).min()?;
    let max = responses.iter().map(|r| r.confidence).max()?;
    (max - min > MAX_CONFIDENCE_SPREAD).then(|| {
        format!(
            "Significant confidence variance between agents ({}% to {}%)",
            min, max
        )
    })
}

fn review_disagreement(responses: &[AgentResponse]) -> Option<String> {
    let flagged = responses
        .iter()
        .filter(|r| r.requires_human_verification)
        .count();
    (flagged > 0 && flagged < responses.len()).then(|| REVIEW_DISAGREEMENT.to_string())
}

/// Combines the primary and verifier confidences.
///
/// With consensus this is the rounded mean; without it, the lowest
/// confidence scaled by 0.7.
pub fn aggregate_confidence(consensus_reached: bool, confidences: &[u8]) -> u8 {
    if confidences.is_empty() {
        return 0;
    }
    let value = if consensus_reached {
        confidences.iter().map(|c| f64::from(*c)).sum::<f64>() / confidences.len() as f64
    } else {
        let min = confidences.iter().copied().min().unwrap_or(0);
        f64::from(min) * DISAGREEMENT_FACTOR
    };
    value.round().clamp(0.0, 100.0) as u8
}

/// Picks the recommendation text. First matching row wins:
///
/// | consensus | confidence | discrepancies | recommendation |
/// |-----------|------------|---------------|----------------|
/// | yes | >= 80 | any | high confidence |
/// | yes | >= 60 | any | moderate confidence |
/// | any | any | non-empty | disagreements (first two listed) |
/// | any | any | empty | low confidence |
pub fn recommend(consensus_reached: bool, final_confidence: u8, discrepancies: &[String]) -> String {
    if consensus_reached && final_confidence >= 80 {
        HIGH_CONFIDENCE_RECOMMENDATION.to_string()
    } else if consensus_reached && final_confidence >= 60 {
        MODERATE_CONFIDENCE_RECOMMENDATION.to_string()
    } else if !discrepancies.is_empty() {
        let listed: Vec<&str> = discrepancies.iter().take(2).map(String::as_str).collect();
        format!("{}{}", DISAGREEMENT_RECOMMENDATION_PREFIX, listed.join("; "))
    } else {
        LOW_CONFIDENCE_RECOMMENDATION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_types::AgentType;

    fn response(confidence: u8, requires_human_verification: bool) -> AgentResponse {
        AgentResponse {
            agent: AgentType::Compliance,
            response: "answer".to_string(),
            confidence,
            sources: Vec::new(),
            metadata: Default::default(),
            requires_human_verification,
        }
    }

    fn responses(confidences: &[u8]) -> Vec<AgentResponse> {
        confidences.iter().map(|c| response(*c, false)).collect()
    }

    #[test]
    fn score_of_nothing_is_zero() {
        assert_eq!(calculate_confidence_score(&[]), 0);
    }

    #[test]
    fn identical_confidences_are_not_penalised() {
        for value in [0, 37, 64, 100] {
            assert_eq!(calculate_confidence_score(&responses(&[value; 4])), value);
        }
    }

    #[test]
    fn variance_penalty_is_half_the_stddev() {
        // mean 70, stddev 10 -> penalty 5
        assert_eq!(calculate_confidence_score(&responses(&[60, 80])), 65);
    }

    #[test]
    fn variance_penalty_is_capped_at_twenty() {
        // mean 50, stddev 50 -> penalty 20, not 25
        assert_eq!(calculate_confidence_score(&responses(&[0, 100])), 30);
        // stddev exactly 40 -> penalty 20
        assert_eq!(calculate_confidence_score(&responses(&[10, 90])), 30);
    }

    #[test]
    fn score_never_goes_below_zero() {
        // mean 4, stddev 12 -> 4 - 6 floors at 0
        let mut skewed = vec![0; 9];
        skewed.push(40);
        assert_eq!(calculate_confidence_score(&responses(&skewed)), 0);
    }

    #[test]
    fn single_response_has_no_discrepancies() {
        assert!(detect_discrepancies(&[response(5, true)]).is_empty());
        assert!(detect_discrepancies(&[]).is_empty());
    }

    #[test]
    fn wide_confidence_spread_is_reported_once() {
        let found = detect_discrepancies(&responses(&[50, 85]));
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("variance"));

        assert!(detect_discrepancies(&responses(&[50, 70])).is_empty());
        assert!(detect_discrepancies(&responses(&[50, 80])).is_empty());
    }

    #[test]
    fn review_flag_split_is_reported() {
        let split = detect_discrepancies(&[response(80, true), response(80, false)]);
        assert_eq!(split, vec![REVIEW_DISAGREEMENT.to_string()]);

        let agreed = detect_discrepancies(&[response(80, true), response(80, true)]);
        assert!(!agreed.contains(&REVIEW_DISAGREEMENT.to_string()));
    }

    #[test]
    fn checks_report_in_declaration_order() {
        let found = detect_discrepancies(&[response(10, true), response(95, false)]);
        assert_eq!(found.len(), 2);
        assert!(found[0].contains("variance"));
        assert_eq!(found[1], REVIEW_DISAGREEMENT);
    }

    #[test]
    fn aggregate_with_consensus_is_the_mean() {
        assert_eq!(aggregate_confidence(true, &[90, 80, 100]), 90);
        assert_eq!(aggregate_confidence(true, &[70, 75]), 73);
    }

    #[test]
    fn aggregate_without_consensus_penalises_the_minimum() {
        assert_eq!(aggregate_confidence(false, &[90, 40, 85]), 28);
        assert_eq!(aggregate_confidence(false, &[]), 0);
    }

    #[test]
    fn recommendation_table_order() {
        let discrepancies = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        assert_eq!(
            recommend(true, 81, &discrepancies),
            HIGH_CONFIDENCE_RECOMMENDATION
        );
        assert_eq!(recommend(true, 80, &[]), HIGH_CONFIDENCE_RECOMMENDATION);
        assert_eq!(
            recommend(true, 60, &discrepancies),
            MODERATE_CONFIDENCE_RECOMMENDATION
        );
        assert_eq!(
            recommend(true, 59, &discrepancies),
            "Human verification recommended due to agent disagreements: a; b"
        );
        assert_eq!(
            recommend(false, 95, &discrepancies[..1]),
            "Human verification recommended due to agent disagreements: a"
        );
        assert_eq!(recommend(false, 95, &[]), LOW_CONFIDENCE_RECOMMENDATION);
        assert_eq!(recommend(true, 10, &[]), LOW_CONFIDENCE_RECOMMENDATION);
    }
}
