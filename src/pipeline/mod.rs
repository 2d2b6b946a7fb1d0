/*!
 * The resumable translation pipeline.
 *
 * The pipeline is organized in these stages:
 * - `plan`: scan entity snapshots for cells missing the target locale
 * - `checkpoint`: durable progress record, written after every batch
 * - `results`: id-deduplicated accumulator of fully-translated entities
 * - `batch`: bounded-concurrency worker pool over the translation backend
 */

pub mod batch;
pub mod checkpoint;
pub mod plan;
pub mod results;

pub use batch::{BatchRunner, GroupResult};
pub use checkpoint::{FailureRecord, ProgressStore, TranslationProgress};
pub use plan::{BacklogPlan, EntityRecord, PlanStats, plan_backlog};
pub use results::ResultStore;
