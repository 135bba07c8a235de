//! Qualification pipeline.
//!
//! Flow: build_prompt → backend.generate → normalize → score → classify.
//!
//! `qualify` never fails. Bad *content* from the backend is absorbed by the
//! normalizer fallback; a backend *failure* (error, timeout) produces the fixed
//! degraded result below. The two paths log differently and are recorded in
//! `QualificationResult::analysis_source`.

use std::sync::Arc;

use tracing::{error, info};

use crate::llm_client::TextGenerator;
use crate::qualification::models::{
    Analysis, AnalysisSource, LeadInput, Priority, QualificationResult, Thresholds,
};
use crate::qualification::normalizer::{normalize_with_outcome, NormalizeOutcome};
use crate::qualification::prompts::build_prompt;
use crate::qualification::scoring::{classify, score};

pub const DEGRADED_SCORE: f64 = 50.0;
pub const DEGRADED_PRIORITY: Priority = Priority::Warm;
pub const DEGRADED_RECOMMENDED_ACTION: &str = "Manual review required - AI analysis failed";

/// Result returned when the backend could not produce any text.
pub fn degraded_result() -> QualificationResult {
    QualificationResult {
        score: DEGRADED_SCORE,
        priority: DEGRADED_PRIORITY,
        analysis: Analysis::with_action(DEGRADED_RECOMMENDED_ACTION),
        analysis_source: AnalysisSource::BackendUnavailable,
    }
}

/// Stateless apart from the shared backend handle, which is call-only.
/// Safe to share across tasks and to run concurrently for independent leads.
#[derive(Clone)]
pub struct QualificationPipeline {
    generator: Arc<dyn TextGenerator>,
    thresholds: Thresholds,
}

impl QualificationPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, thresholds: Thresholds) -> Self {
        Self {
            generator,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub async fn qualify(&self, lead: &LeadInput) -> QualificationResult {
        info!("Analyzing lead: {}", lead.name);

        let prompt = build_prompt(lead);

        let raw = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("AI analysis failed for lead {}: {e}", lead.name);
                return degraded_result();
            }
        };

        let result = self.evaluate(&raw);

        info!(
            "Lead qualified: {} (score: {}, priority: {}, source: {:?})",
            lead.name, result.score, result.priority, result.analysis_source
        );

        result
    }

    /// Normalizes raw backend text and scores it against this pipeline's thresholds.
    pub fn evaluate(&self, raw: &str) -> QualificationResult {
        let (analysis, outcome) = normalize_with_outcome(raw);
        let score = score(&analysis);
        let priority = classify(score, &self.thresholds);
        let analysis_source = match outcome {
            NormalizeOutcome::Parsed => AnalysisSource::Model,
            NormalizeOutcome::Fallback => AnalysisSource::MalformedResponse,
        };

        QualificationResult {
            score,
            priority,
            analysis,
            analysis_source,
        }
    }
}
