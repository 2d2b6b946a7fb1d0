/*!
 * Dedup and batch construction tests
 */

use locfill::dedup::{TranslationTask, group_tasks, into_batches};

fn task(entity_id: &str, field: &str, text: &str, lang: &str) -> TranslationTask {
    TranslationTask {
        entity_id: entity_id.to_string(),
        field: field.to_string(),
        source_text: text.to_string(),
        source_lang: lang.to_string(),
    }
}

#[test]
fn test_group_order_follows_first_appearance() {
    let groups = group_tasks(vec![
        task("1", "name", "서초구", "ko"),
        task("2", "name", "강남구", "ko"),
        task("3", "name", "서초구", "ko"),
        task("4", "name", "송파구", "ko"),
    ]);

    let texts: Vec<&str> = groups.iter().map(|g| g.text.as_str()).collect();
    assert_eq!(texts, ["서초구", "강남구", "송파구"]);
}

#[test]
fn test_one_entity_can_own_a_group_through_several_fields() {
    let groups = group_tasks(vec![
        task("1", "name", "강남구", "ko"),
        task("1", "description", "강남구", "ko"),
    ]);

    assert_eq!(groups.len(), 1);
    let fields: Vec<&str> = groups[0].owners.iter().map(|o| o.field.as_str()).collect();
    assert_eq!(fields, ["name", "description"]);
}

#[test]
fn test_batch_chunking_over_a_large_backlog() {
    let tasks: Vec<TranslationTask> = (0..120)
        .map(|i| task(&i.to_string(), "name", &format!("텍스트 {}", i), "ko"))
        .collect();

    let batches = into_batches(group_tasks(tasks), 50);
    let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
    assert_eq!(sizes, [50, 50, 20]);
}

#[test]
fn test_mixed_language_backlog_splits_per_language_first() {
    let mut tasks = Vec::new();
    for i in 0..3 {
        tasks.push(task(&format!("k{}", i), "name", &format!("한국어 {}", i), "ko"));
    }
    for i in 0..2 {
        tasks.push(task(&format!("e{}", i), "name", &format!("english {}", i), "en"));
    }

    let batches = into_batches(group_tasks(tasks), 10);
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0][0].source_lang, "ko");
    assert_eq!(batches[1][0].source_lang, "en");
}
