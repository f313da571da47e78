//! jobs.rs: submit/poll lifecycle around the engine.
//!
//! A submission gets an id immediately and is scored on a spawned task:
//! text source → history snapshot → evaluate → record → complete.
//! Jobs only ever move `Processing → Complete | Failed`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analyze::SubScores;
use crate::engine::{anon_hash, record, Engine, Evaluation, EvaluationInput};
use crate::generator::{brand_prompt, ResponseGenerator};
use crate::history::HistoryStore;

/// Registry keeps at most this many jobs; oldest finished jobs go first.
pub const DEFAULT_MAX_JOBS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Processing,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub response_id: Uuid,
    pub brand_name: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_llm_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_scores: Option<SubScores>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub semantic_degraded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Inner {
    jobs: HashMap<Uuid, JobRecord>,
    order: VecDeque<Uuid>,
}

#[derive(Debug)]
pub struct JobRegistry {
    inner: Mutex<Inner>,
    max_jobs: usize,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_JOBS)
    }
}

impl JobRegistry {
    pub fn with_capacity(max_jobs: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_jobs: max_jobs.max(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new `Processing` job and return its id.
    pub fn create(&self, brand_name: &str, raw_text: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let rec = JobRecord {
            response_id: id,
            brand_name: brand_name.to_string(),
            status: JobStatus::Processing,
            raw_llm_response: raw_text.map(str::to_string),
            visibility_score: None,
            sub_scores: None,
            keywords: Vec::new(),
            semantic_degraded: false,
            error: None,
            submitted_at: Utc::now(),
            processed_at: None,
        };

        let mut g = self.lock();
        g.jobs.insert(id, rec);
        g.order.push_back(id);
        self.evict(&mut g);
        id
    }

    /// Drop oldest terminal jobs while over capacity. Running jobs are kept.
    fn evict(&self, g: &mut Inner) {
        let mut scanned = 0;
        while g.jobs.len() > self.max_jobs && scanned < g.order.len() {
            let Some(id) = g.order.pop_front() else { break };
            let terminal = g.jobs.get(&id).is_some_and(|r| r.status.is_terminal());
            if terminal {
                g.jobs.remove(&id);
            } else {
                g.order.push_back(id);
                scanned += 1;
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<JobRecord> {
        self.lock().jobs.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_text(&self, id: &Uuid, text: &str) {
        if let Some(rec) = self.lock().jobs.get_mut(id) {
            rec.raw_llm_response = Some(text.to_string());
        }
    }

    /// Terminal states are final; later transitions are ignored.
    pub fn complete(&self, id: &Uuid, eval: &Evaluation) {
        if let Some(rec) = self.lock().jobs.get_mut(id) {
            if rec.status.is_terminal() {
                return;
            }
            rec.status = JobStatus::Complete;
            rec.visibility_score = Some(eval.visibility_score);
            rec.sub_scores = Some(eval.sub_scores);
            rec.keywords = eval.keywords.clone();
            rec.semantic_degraded = eval.semantic_degraded;
            rec.processed_at = Some(Utc::now());
        }
    }

    pub fn fail(&self, id: &Uuid, error: impl Into<String>) {
        if let Some(rec) = self.lock().jobs.get_mut(id) {
            if rec.status.is_terminal() {
                return;
            }
            rec.status = JobStatus::Failed;
            rec.error = Some(error.into());
            rec.processed_at = Some(Utc::now());
        }
    }
}

/// Body of one spawned job. Never panics; failures end in `Failed`.
pub async fn run_job(
    jobs: &JobRegistry,
    engine: &Engine,
    history: &dyn HistoryStore,
    generator: &dyn ResponseGenerator,
    id: Uuid,
    brand_name: &str,
    raw_text: Option<String>,
) {
    let text = match raw_text {
        Some(t) => t,
        None => match generator.generate(&brand_prompt(brand_name)).await {
            Ok(t) => {
                jobs.set_text(&id, &t);
                t
            }
            Err(e) => {
                warn!(target: "visibility", %id, generator = generator.name(), "generation failed: {e:#}");
                counter!("visibility_jobs_failed_total").increment(1);
                jobs.fail(&id, format!("generation failed: {e}"));
                return;
            }
        },
    };

    let outcome = match EvaluationInput::new(brand_name, text) {
        Ok(input) => {
            let snapshot = history.snapshot(input.brand_name());
            engine.evaluate(&input, &snapshot).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(eval) => {
            record(history, &eval.brand_name, eval.visibility_score);
            jobs.complete(&id, &eval);
            info!(
                target: "visibility",
                %id,
                brand = %anon_hash(&eval.brand_name),
                score = eval.visibility_score,
                "job complete"
            );
        }
        Err(e) => {
            warn!(target: "visibility", %id, error = %e, "job failed");
            counter!("visibility_jobs_failed_total").increment(1);
            jobs.fail(&id, e.to_string());
        }
    }
}
