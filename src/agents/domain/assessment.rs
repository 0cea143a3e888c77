//! Qualification verdict produced by the scoring pass

use serde::{Deserialize, Serialize};

/// Lowest score the rubric allows
pub const MIN_SCORE: u8 = 1;
/// Highest score the rubric allows
pub const MAX_SCORE: u8 = 100;
/// Score reported when no usable assessment could be parsed
pub const FALLBACK_SCORE: u8 = 50;

/// Keys every scoring reply must carry
pub const REQUIRED_KEYS: [&str; 4] = ["good_signals", "bad_signals", "score", "reasoning"];

/// Final structured verdict of a research run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub good_signals: Vec<String>,
    pub bad_signals: Vec<String>,
    /// Always within `MIN_SCORE..=MAX_SCORE`
    pub score: u8,
    pub reasoning: String,
    /// Last unparseable model reply, only present on the fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl Assessment {
    /// Neutral verdict used once every scoring attempt has failed
    pub fn fallback(attempts: u32, raw_response: Option<String>) -> Self {
        Self {
            good_signals: Vec::new(),
            bad_signals: Vec::new(),
            score: FALLBACK_SCORE,
            reasoning: format!("Error parsing assessment after {} retries", attempts),
            raw_response,
        }
    }

    /// Whether this verdict came from `fallback`
    pub fn is_fallback(&self) -> bool {
        self.raw_response.is_some() || self.reasoning.starts_with("Error parsing assessment")
    }
}

/// Wire shape of a scoring reply before range normalisation
#[derive(Debug, Deserialize)]
pub(crate) struct ScoredReply {
    pub good_signals: Vec<String>,
    pub bad_signals: Vec<String>,
    pub score: f64,
    pub reasoning: String,
}

impl From<ScoredReply> for Assessment {
    fn from(reply: ScoredReply) -> Self {
        let score = if reply.score.is_finite() {
            reply.score.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
        } else {
            FALLBACK_SCORE
        };

        Self {
            good_signals: reply.good_signals,
            bad_signals: reply.bad_signals,
            score,
            reasoning: reply.reasoning,
            raw_response: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let fallback = Assessment::fallback(3, Some("not json".to_string()));
        assert_eq!(fallback.score, 50);
        assert!(fallback.good_signals.is_empty());
        assert!(fallback.bad_signals.is_empty());
        assert_eq!(fallback.reasoning, "Error parsing assessment after 3 retries");
        assert!(fallback.is_fallback());
    }

    #[test]
    fn test_scores_are_clamped_into_range() {
        let reply = |score: f64| ScoredReply {
            good_signals: vec![],
            bad_signals: vec![],
            score,
            reasoning: String::new(),
        };

        assert_eq!(Assessment::from(reply(0.0)).score, MIN_SCORE);
        assert_eq!(Assessment::from(reply(250.0)).score, MAX_SCORE);
        assert_eq!(Assessment::from(reply(72.4)).score, 72);
        assert_eq!(Assessment::from(reply(f64::NAN)).score, FALLBACK_SCORE);
    }

    #[test]
    fn test_raw_response_skipped_when_absent() {
        let assessment = Assessment::from(ScoredReply {
            good_signals: vec!["hiring security engineers".to_string()],
            bad_signals: vec![],
            score: 81.0,
            reasoning: "strong need".to_string(),
        });
        let json = serde_json::to_value(&assessment).unwrap();
        assert!(json.get("raw_response").is_none());
        assert_eq!(json["score"], 81);
    }
}
