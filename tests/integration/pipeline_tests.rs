/*!
 * End-to-end pipeline tests against the scriptable offline backend.
 *
 * Each test runs the full controller path: plan, dedup, batch, fan-out,
 * checkpoint, result accumulation. The mock backend records every call,
 * which is what the billing-sensitive assertions count.
 */

use std::fs;
use std::sync::Arc;

use serde_json::json;

use crate::common;
use locfill::providers::MockTranslator;
use locfill::{Controller, TranslationBackend};

#[tokio::test]
async fn test_full_backfill_dedups_and_fans_out() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let mock = MockTranslator::new();
    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    let backend: Arc<dyn TranslationBackend> = Arc::new(mock.clone());

    let report = controller.run_with_backend(input, backend).await.unwrap();

    // Three cells, two distinct strings, one batch
    assert_eq!(report.plan.queued_cells, 3);
    assert_eq!(report.distinct_strings, 2);
    assert_eq!(report.batches, 1);
    assert_eq!(report.updated_cells, 3);
    assert_eq!(report.translated_groups, 2);
    assert_eq!(report.failed_groups, 0);
    assert_eq!(mock.call_count(), 1);

    // Both owners of the duplicated string share one translation
    let results = common::read_results(&out_dir, "district", "ru_RU").unwrap();
    assert_eq!(results.len(), 3);
    let expected = MockTranslator::expected_translation("강남구", "ru");
    assert_eq!(common::entry_by_id(&results, "1")["name"]["ru_RU"], *expected);
    assert_eq!(common::entry_by_id(&results, "2")["name"]["ru_RU"], *expected);
    assert_eq!(
        common::entry_by_id(&results, "3")["name"]["ru_RU"],
        *MockTranslator::expected_translation("서초구", "ru")
    );
    // Source locales are untouched
    assert_eq!(common::entry_by_id(&results, "1")["name"]["ko_KR"], "강남구");

    // Clean completion removes the checkpoint
    assert!(!common::progress_path(&out_dir, "ru_RU").exists());
}

#[tokio::test]
async fn test_second_run_pays_nothing() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    controller
        .run_with_backend(input.clone(), Arc::new(MockTranslator::new()))
        .await
        .unwrap();

    let mock = MockTranslator::new();
    let report = controller
        .run_with_backend(input, Arc::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(report.plan.skipped_completed_entities, 3);
    assert_eq!(report.distinct_strings, 0);
    assert_eq!(report.updated_cells, 0);
    assert_eq!(mock.call_count(), 0);

    // The result file still holds all three entities
    let results = common::read_results(&out_dir, "district", "ru_RU").unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_failed_string_keeps_checkpoint_then_resumes() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();

    // 서초구 fails even as a single item; 강남구 still lands via fallback
    let mock = MockTranslator::new();
    mock.poison_text("서초구");
    let report = controller
        .run_with_backend(input.clone(), Arc::new(mock))
        .await
        .unwrap();

    assert_eq!(report.translated_groups, 1);
    assert_eq!(report.failed_groups, 1);
    assert_eq!(report.updated_cells, 2);
    assert_eq!(report.completed_entities, 2);

    // The checkpoint survives, records the failure, and uses camelCase keys
    let progress_path = common::progress_path(&out_dir, "ru_RU");
    assert!(progress_path.exists());
    let raw = fs::read_to_string(&progress_path).unwrap();
    assert!(raw.contains("processedCount"));
    let progress: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(progress["failures"].as_array().unwrap().len(), 1);
    assert_eq!(progress["failures"][0]["targetLocale"], "ru_RU");

    // Second run re-queues only the failed entity and completes cleanly
    let mock = MockTranslator::new();
    let report = controller
        .run_with_backend(input, Arc::new(mock.clone()))
        .await
        .unwrap();

    assert!(report.resumed);
    assert_eq!(report.plan.skipped_completed_entities, 2);
    assert_eq!(report.updated_cells, 1);
    assert_eq!(report.completed_entities, 3);
    assert_eq!(mock.call_count(), 1);
    assert!(!progress_path.exists());

    let results = common::read_results(&out_dir, "district", "ru_RU").unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_transient_batch_failure_recovers_per_item() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let mock = MockTranslator::new();
    mock.fail_next_calls(1);

    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    let report = controller
        .run_with_backend(input, Arc::new(mock.clone()))
        .await
        .unwrap();

    // One failed batch call, then one per-item call per distinct string
    assert_eq!(mock.call_count(), 3);
    assert_eq!(mock.batch_call_count(), 1);
    assert_eq!(report.failed_groups, 0);
    assert_eq!(report.updated_cells, 3);
    assert!(!common::progress_path(&out_dir, "ru_RU").exists());
}

#[tokio::test]
async fn test_legacy_bare_string_is_migrated_on_write() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let export = json!([
        {"id": "1", "name": "강남"}
    ]);
    let input = common::write_export(dir.path(), "districts.json", &export).unwrap();

    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    let report = controller
        .run_with_backend(input, Arc::new(MockTranslator::new()))
        .await
        .unwrap();

    assert_eq!(report.plan.legacy_bare_cells, 1);
    assert_eq!(report.updated_cells, 1);

    let results = common::read_results(&out_dir, "district", "ru_RU").unwrap();
    assert_eq!(
        results[0]["name"],
        json!({
            "ko_KR": "강남",
            "ru_RU": MockTranslator::expected_translation("강남", "ru")
        })
    );
}

#[tokio::test]
async fn test_plan_only_reports_without_touching_anything() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let mut config = common::test_config(&out_dir);
    config.job.plan_only = true;

    let mock = MockTranslator::new();
    let controller = Controller::with_config(config).unwrap();
    let report = controller
        .run_with_backend(input, Arc::new(mock.clone()))
        .await
        .unwrap();

    assert!(report.plan_only);
    assert_eq!(report.plan.queued_cells, 3);
    assert_eq!(report.distinct_strings, 2);
    assert_eq!(report.batches, 1);
    assert_eq!(mock.call_count(), 0);
    assert!(!common::progress_path(&out_dir, "ru_RU").exists());
    assert!(!out_dir.join("translated-district-ru_RU.json").exists());
}

#[tokio::test]
async fn test_dry_run_executes_but_writes_nothing() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let mut config = common::test_config(&out_dir);
    config.job.dry_run = true;

    let controller = Controller::with_config(config).unwrap();
    let report = controller
        .run_with_backend(input, Arc::new(MockTranslator::new()))
        .await
        .unwrap();

    assert_eq!(report.updated_cells, 3);
    assert_eq!(report.failed_groups, 0);
    // Nothing on disk, not even the output directory
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn test_force_retranslates_filled_cells() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "districts.json", &common::district_export()).unwrap();

    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    controller
        .run_with_backend(input.clone(), Arc::new(MockTranslator::new()))
        .await
        .unwrap();

    let mut config = common::test_config(&out_dir);
    config.job.force = true;
    let controller = Controller::with_config(config).unwrap();

    let mock = MockTranslator::new();
    let report = controller
        .run_with_backend(input, Arc::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(report.plan.skipped_completed_entities, 0);
    assert_eq!(report.updated_cells, 3);
    assert_eq!(mock.call_count(), 1);

    let results = common::read_results(&out_dir, "district", "ru_RU").unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_cells_already_translated_are_left_alone() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let export = json!([
        {"id": "1", "name": {"ko_KR": "강남구", "ru_RU": "Каннамгу"}},
        {"id": "2", "name": {"ko_KR": "서초구"}}
    ]);
    let input = common::write_export(dir.path(), "districts.json", &export).unwrap();

    let mock = MockTranslator::new();
    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    let report = controller
        .run_with_backend(input, Arc::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(report.plan.skipped_already_translated_cells, 1);
    assert_eq!(report.updated_cells, 1);
    assert_eq!(mock.calls()[0].texts, vec!["서초구".to_string()]);

    // Only the entity that actually needed work lands in the result file
    let results = common::read_results(&out_dir, "district", "ru_RU").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(
        common::entry_by_id(&results, "2")["name"]["ru_RU"],
        *MockTranslator::expected_translation("서초구", "ru")
    );
}

#[tokio::test]
async fn test_malformed_input_document_is_fatal() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("out");
    let input = common::write_export(dir.path(), "bad.json", &json!({"not": "an array"})).unwrap();

    let controller = Controller::with_config(common::test_config(&out_dir)).unwrap();
    let result = controller
        .run_with_backend(input, Arc::new(MockTranslator::new()))
        .await;

    assert!(result.is_err());
    assert!(!out_dir.join("translated-district-ru_RU.json").exists());
}
