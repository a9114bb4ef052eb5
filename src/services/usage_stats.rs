// Usage Statistics
// Running totals over fresh analyses. Persistence belongs to the caller.

use serde::{Deserialize, Serialize};

/// Scores at or above this count as AI-detected.
pub const AI_DETECTED_THRESHOLD: i32 = 60;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    #[serde(default, alias = "totalAnalyzed")]
    pub total_analyses: u64,
    #[serde(default)]
    pub ai_detected: u64,
    #[serde(default)]
    pub total_score: u64,
}

impl UsageStats {
    pub fn record(&mut self, ai_score: i32) {
        self.total_analyses += 1;
        if ai_score >= AI_DETECTED_THRESHOLD {
            self.ai_detected += 1;
        }
        self.total_score += ai_score.clamp(0, 100) as u64;
    }

    /// Rounded mean score, 0 before any analysis.
    pub fn average_score(&self) -> u64 {
        if self.total_analyses == 0 {
            return 0;
        }
        (self.total_score as f64 / self.total_analyses as f64).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_average() {
        let mut stats = UsageStats::default();
        assert_eq!(stats.average_score(), 0);
        stats.record(80);
        stats.record(59);
        stats.record(60);
        assert_eq!(stats.total_analyses, 3);
        assert_eq!(stats.ai_detected, 2);
        assert_eq!(stats.total_score, 199);
        assert_eq!(stats.average_score(), 66);
    }

    #[test]
    fn test_legacy_key_is_accepted() {
        let stats: UsageStats = serde_json::from_str(r#"{"totalAnalyzed": 4, "totalScore": 200}"#).unwrap();
        assert_eq!(stats.total_analyses, 4);
        assert_eq!(stats.ai_detected, 0);
        assert_eq!(stats.average_score(), 50);
        assert!(serde_json::to_string(&stats).unwrap().contains("\"totalAnalyses\":4"));
    }
}
