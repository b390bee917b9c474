//! Pit strategy advice
//!
//! The language-model call is an opaque collaborator behind the
//! `StrategyAdvisor` trait. The shipped implementation is a rule-based
//! heuristic; when any advisor fails, callers degrade to a fixed fallback
//! triple instead of surfacing the error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// How many trailing stint-history entries inform the advice.
const HISTORY_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Structured recommendation returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAdvice {
    pub recommendation: String,
    pub reasoning: String,
    pub confidence: Confidence,
}

/// Race situation handed to an advisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyContext {
    pub current_lap_data: Value,
    pub stint_history: Vec<Value>,
    /// Fraction of the race completed, in [0, 1].
    pub race_progress: f64,
}

#[async_trait]
pub trait StrategyAdvisor: Send + Sync {
    async fn advise(&self, context: &StrategyContext) -> anyhow::Result<StrategyAdvice>;
}

/// Degraded advice when the advisor itself fails.
pub fn fallback_advice(reason: &str) -> StrategyAdvice {
    StrategyAdvice {
        recommendation: "Continue".to_string(),
        reasoning: format!("(fallback: {reason})"),
        confidence: Confidence::Low,
    }
}

/// Run an advisor, degrading to the fallback triple on failure.
pub async fn advise_or_fallback(
    advisor: &dyn StrategyAdvisor,
    context: &StrategyContext,
) -> StrategyAdvice {
    match advisor.advise(context).await {
        Ok(advice) => advice,
        Err(e) => {
            warn!(error = %e, "strategy advisor failed, using fallback");
            fallback_advice(&e.to_string())
        }
    }
}

/// Rule-based advisor working from tyre age, recent pace and race
/// progress. Stands in for the external language-model call.
pub struct HeuristicAdvisor;

impl HeuristicAdvisor {
    fn recent_pace_trend(history: &[Value]) -> Option<f64> {
        let times: Vec<f64> = history
            .iter()
            .rev()
            .take(HISTORY_WINDOW)
            .filter_map(|lap| lap.get("lap_time_seconds").and_then(Value::as_f64))
            .collect();
        if times.len() < 2 {
            return None;
        }
        // Entries were taken newest-first.
        Some(times.first().unwrap_or(&0.0) - times.last().unwrap_or(&0.0))
    }
}

#[async_trait]
impl StrategyAdvisor for HeuristicAdvisor {
    async fn advise(&self, context: &StrategyContext) -> anyhow::Result<StrategyAdvice> {
        let tyre_life = context
            .current_lap_data
            .get("tyre_life")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let trend = Self::recent_pace_trend(&context.stint_history);

        if context.race_progress >= 0.9 {
            return Ok(StrategyAdvice {
                recommendation: "Stay out".to_string(),
                reasoning: "Too few laps remain to recover a pit stop.".to_string(),
                confidence: Confidence::High,
            });
        }

        let degrading = trend.map(|t| t > 0.5).unwrap_or(false);
        if tyre_life >= 20.0 || (tyre_life >= 12.0 && degrading) {
            return Ok(StrategyAdvice {
                recommendation: "Pit within 2 laps".to_string(),
                reasoning: format!(
                    "Tyres are {tyre_life:.0} laps old and recent pace is {}.",
                    if degrading { "falling away" } else { "near the limit of the stint" }
                ),
                confidence: if degrading {
                    Confidence::High
                } else {
                    Confidence::Medium
                },
            });
        }

        Ok(StrategyAdvice {
            recommendation: "Continue".to_string(),
            reasoning: "Tyres have life left and pace is stable.".to_string(),
            confidence: Confidence::Medium,
        })
    }
}
