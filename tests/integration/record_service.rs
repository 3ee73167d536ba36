use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::thread;

use stockroom::error::ApiError;
use stockroom::types::FieldUpdate;
use tempfile::TempDir;

use crate::integration::support::{collection_file, new_record, row_count, service_in};

const DRILLS: (&str, &str, &str) = ("tools", "acme", "drills");
const SAWS: (&str, &str, &str) = ("tools", "bolt", "saws");
const FRUIT: (&str, &str, &str) = ("food", "farm", "fruit");

#[test]
fn create_adds_exactly_one_record_with_fresh_id() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let mut seen = HashSet::new();

    for i in 0..5 {
        let before = service.list_all().unwrap();
        let created = service
            .create(new_record(DRILLS, &format!("Drill {}", i), 10.0 + i as f64, i))
            .unwrap();
        assert!(seen.insert(created.record.id.clone()), "id reused");

        let after = service.list_all().unwrap();
        assert_eq!(after.len(), before.len() + 1);
        let matches: Vec<_> = after
            .iter()
            .filter(|r| r.record.id == created.record.id)
            .collect();
        assert_eq!(matches.len(), 1);
        let found = matches[0];
        assert_eq!(found.record.name, format!("Drill {}", i));
        assert_eq!(found.record.price, 10.0 + i as f64);
        assert_eq!(found.record.stock, i);
        assert_eq!(found.location.to_string(), "tools/acme/drills");
    }
}

#[test]
fn create_with_empty_segment_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);

    for location in [("", "acme", "x"), ("tools", "", "x"), ("tools", "acme", " ")] {
        let err = service.create(new_record(location, "Hammer", 1.0, 1)).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)), "{:?}", err);
    }
    assert!(!temp.path().join("data").exists());
}

#[test]
fn create_rejects_path_traversal() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let err = service
        .create(new_record(("..", "..", "escape"), "Hammer", 1.0, 1))
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
    assert!(!temp.path().join("escape").exists());
}

#[test]
fn update_stock_changes_only_that_field() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let target = service.create(new_record(SAWS, "Hand saw", 25.0, 2)).unwrap();
    service.create(new_record(SAWS, "Jigsaw", 80.0, 1)).unwrap();
    let file = collection_file(&temp, SAWS);
    let rows_before = row_count(&file);

    service
        .update(&target.record.id, FieldUpdate::Stock(5))
        .unwrap();

    let found = service.find_by_id(&target.record.id).unwrap().unwrap();
    assert_eq!(found.record.stock, 5);
    assert_eq!(found.record.name, target.record.name);
    assert_eq!(found.record.price, target.record.price);
    assert_eq!(found.record.description, target.record.description);
    assert_eq!(found.location, target.location);
    assert_eq!(row_count(&file), rows_before);
}

#[test]
fn update_parsed_from_text() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let target = service.create(new_record(FRUIT, "Apple", 0.5, 100)).unwrap();

    let change = FieldUpdate::parse("price", "0.75").unwrap();
    service.update(&target.record.id, change).unwrap();
    let change = FieldUpdate::parse("stock", "12.0").unwrap();
    service.update(&target.record.id, change).unwrap();

    let found = service.find_by_id(&target.record.id).unwrap().unwrap();
    assert_eq!(found.record.price, 0.75);
    assert_eq!(found.record.stock, 12);
    let text = fs::read_to_string(collection_file(&temp, FRUIT)).unwrap();
    assert!(text.contains(",0.75,12,"));
}

#[test]
fn update_rejects_invalid_values_without_writing() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let target = service.create(new_record(FRUIT, "Apple", 0.5, 100)).unwrap();
    let file = collection_file(&temp, FRUIT);
    let before = fs::read_to_string(&file).unwrap();

    assert!(matches!(
        service.update(&target.record.id, FieldUpdate::Name("  ".into())),
        Err(ApiError::ValidationError(_))
    ));
    assert!(matches!(
        service.update(&target.record.id, FieldUpdate::Price(-1.0)),
        Err(ApiError::ValidationError(_))
    ));
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn delete_removes_one_row_from_owning_store() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let doomed = service.create(new_record(DRILLS, "Old drill", 5.0, 1)).unwrap();
    service.create(new_record(DRILLS, "New drill", 50.0, 3)).unwrap();
    service.create(new_record(SAWS, "Saw", 15.0, 3)).unwrap();
    let drills = collection_file(&temp, DRILLS);
    let saws = collection_file(&temp, SAWS);
    let (drills_before, saws_before) = (row_count(&drills), row_count(&saws));

    let removed = service.delete(&doomed.record.id).unwrap();
    assert_eq!(removed.item.record.id, doomed.record.id);
    assert!(removed.dropped_rows.is_empty());

    assert!(service.find_by_id(&doomed.record.id).unwrap().is_none());
    assert_eq!(row_count(&drills), drills_before - 1);
    assert_eq!(row_count(&saws), saws_before);

    assert!(matches!(
        service.delete(&doomed.record.id),
        Err(ApiError::RecordNotFound(_))
    ));
}

#[test]
fn deleting_last_record_leaves_empty_collection() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let only = service.create(new_record(FRUIT, "Pear", 1.0, 1)).unwrap();
    service.delete(&only.record.id).unwrap();

    let file = collection_file(&temp, FRUIT);
    assert!(file.exists());
    assert_eq!(row_count(&file), 0);
    assert!(service.list_all().unwrap().is_empty());
}

#[test]
fn filter_price_greater_than() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    service.create(new_record(DRILLS, "Cheap", 99.99, 1)).unwrap();
    service.create(new_record(DRILLS, "Exact", 100.0, 1)).unwrap();
    service.create(new_record(SAWS, "Pricey", 100.01, 1)).unwrap();
    service.create(new_record(FRUIT, "Gold apple", 500.0, 1)).unwrap();
    // A malformed row never reaches the filter.
    let file = collection_file(&temp, FRUIT);
    let mut text = fs::read_to_string(&file).unwrap();
    text.push_str("broken,Broken,lots,1,\n");
    fs::write(&file, text).unwrap();

    let all = service.list_all().unwrap();
    let expected: Vec<_> = all
        .iter()
        .filter(|r| r.record.price > 100.0)
        .map(|r| r.record.id.clone())
        .collect();
    let got: Vec<_> = service
        .filter("price", ">100")
        .unwrap()
        .into_iter()
        .map(|r| r.record.id)
        .collect();
    assert_eq!(got, expected);
    assert_eq!(got.len(), 2);
    assert!(!got.contains(&"broken".to_string()));
}

#[test]
fn filter_text_and_unknown_field() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    service.create(new_record(DRILLS, "Impact Driver", 120.0, 1)).unwrap();
    service.create(new_record(FRUIT, "Banana", 0.2, 40)).unwrap();

    let hits = service.filter("name", "driver").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].record.name, "Impact Driver");

    assert_eq!(service.filter("level1", "FOOD").unwrap().len(), 1);
    assert!(service.filter("colour", "red").unwrap().is_empty());
    assert!(service.filter("stock", "many").unwrap().is_empty());
}

#[test]
fn sort_by_price_is_stable_permutation() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    for (loc, name, price) in [
        (DRILLS, "d-a", 20.0),
        (DRILLS, "d-b", 10.0),
        (FRUIT, "f-a", 20.0),
        (SAWS, "s-a", 5.0),
        (SAWS, "s-b", 20.0),
    ] {
        service.create(new_record(loc, name, price, 1)).unwrap();
    }

    let listed = service.list_all().unwrap();
    let sorted = service.sort("price", true).unwrap();
    assert_eq!(sorted.len(), listed.len());
    assert!(sorted
        .windows(2)
        .all(|w| w[0].record.price <= w[1].record.price));

    let mut listed_ids: Vec<_> = listed.iter().map(|r| r.record.id.clone()).collect();
    let mut sorted_ids: Vec<_> = sorted.iter().map(|r| r.record.id.clone()).collect();

    // Equal prices keep traversal order.
    let listed_twenty: Vec<_> = listed
        .iter()
        .filter(|r| r.record.price == 20.0)
        .map(|r| r.record.id.clone())
        .collect();
    let sorted_twenty: Vec<_> = sorted
        .iter()
        .filter(|r| r.record.price == 20.0)
        .map(|r| r.record.id.clone())
        .collect();
    assert_eq!(sorted_twenty, listed_twenty);

    listed_ids.sort();
    sorted_ids.sort();
    assert_eq!(listed_ids, sorted_ids);
}

#[test]
fn sort_descending_and_invalid_field() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    service.create(new_record(DRILLS, "B", 1.0, 3)).unwrap();
    service.create(new_record(FRUIT, "A", 1.0, 9)).unwrap();

    let by_stock = service.sort("stock", false).unwrap();
    assert_eq!(by_stock[0].record.stock, 9);

    let by_level1 = service.sort("level1", true).unwrap();
    assert_eq!(by_level1[0].location.level1, "food");

    assert!(matches!(
        service.sort("description", true),
        Err(ApiError::InvalidField(_))
    ));
}

#[test]
fn statistics_on_empty_and_populated_hierarchy() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);

    let empty = service.statistics().unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.mean_price, 0.0);
    assert_eq!(empty.total_stock, 0);
    assert!(empty.count_by_level1.is_empty());

    let stocks = [3u64, 0, 17, 4];
    let locations = [DRILLS, SAWS, FRUIT, FRUIT];
    for (i, (stock, loc)) in stocks.iter().zip(locations).enumerate() {
        service
            .create(new_record(loc, &format!("item {}", i), 2.0 * (i as f64 + 1.0), *stock))
            .unwrap();
    }

    let stats = service.statistics().unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.total_stock, stocks.iter().sum::<u64>());
    assert!((stats.mean_price - 5.0).abs() < 1e-9);
    assert_eq!(stats.count_by_level1.get("tools"), Some(&2));
    assert_eq!(stats.count_by_level1.get("food"), Some(&2));
}

#[test]
fn malformed_rows_are_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let kept = service.create(new_record(DRILLS, "Drill", 10.0, 1)).unwrap();
    let file = collection_file(&temp, DRILLS);
    let mut text = fs::read_to_string(&file).unwrap();
    text.push_str("bad-price,Broken,abc,1,\nbad-stock,Broken,1.00,x,\n");
    fs::write(&file, text).unwrap();

    let report = service.list_all_with_report().unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].record.id, kept.record.id);
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings.iter().all(|w| w.source == file));
}

#[test]
fn records_written_by_hand_are_read_by_header_name() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let file = collection_file(&temp, SAWS);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(
        &file,
        "name,id,stock,price\n\"Saw, large\",s-1,7,12\n",
    )
    .unwrap();

    let found = service.find_by_id("s-1").unwrap().unwrap();
    assert_eq!(found.record.name, "Saw, large");
    assert_eq!(found.record.stock, 7);
    assert_eq!(found.record.price, 12.0);
    assert_eq!(found.record.description, "");

    // Rewriting normalizes column order and price precision.
    service.update("s-1", FieldUpdate::Stock(8)).unwrap();
    let text = fs::read_to_string(&file).unwrap();
    assert_eq!(
        text,
        "id,name,price,stock,description\ns-1,\"Saw, large\",12.00,8,\n"
    );
}

#[test]
fn duplicate_ids_resolve_to_first_in_traversal_order() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let header = "id,name,price,stock,description\n";
    for (loc, name) in [(FRUIT, "First"), (SAWS, "Second")] {
        let file = collection_file(&temp, loc);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, format!("{}dup,{},1.00,1,\n", header, name)).unwrap();
    }

    let found = service.find_by_id("dup").unwrap().unwrap();
    assert_eq!(found.record.name, "First");

    service.update("dup", FieldUpdate::Stock(3)).unwrap();
    assert!(fs::read_to_string(collection_file(&temp, FRUIT))
        .unwrap()
        .contains("dup,First,1.00,3,"));
    assert!(fs::read_to_string(collection_file(&temp, SAWS))
        .unwrap()
        .contains("dup,Second,1.00,1,"));
}

#[test]
fn concurrent_updates_in_one_leaf_are_all_applied() {
    let temp = TempDir::new().unwrap();
    let service = Arc::new(service_in(&temp));
    let ids: Vec<String> = (0..8)
        .map(|i| {
            service
                .create(new_record(DRILLS, &format!("Drill {}", i), 10.0, i))
                .unwrap()
                .record
                .id
        })
        .collect();
    let file = collection_file(&temp, DRILLS);
    let rows_before = row_count(&file);

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service.update(&id, FieldUpdate::Stock(42)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = service.list_all().unwrap();
    assert_eq!(records.len(), ids.len());
    assert!(records.iter().all(|r| r.record.stock == 42));
    assert_eq!(row_count(&file), rows_before);
}

#[test]
fn concurrent_creates_in_one_leaf_keep_every_row() {
    let temp = TempDir::new().unwrap();
    let service = Arc::new(service_in(&temp));

    let handles: Vec<_> = (0..8u64)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .create(new_record(SAWS, &format!("Saw {}", i), 5.0, i))
                    .unwrap()
            })
        })
        .collect();
    let created: HashSet<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().record.id)
        .collect();

    let listed: HashSet<String> = service
        .list_all()
        .unwrap()
        .into_iter()
        .map(|r| r.record.id)
        .collect();
    assert_eq!(listed, created);
    assert_eq!(row_count(&collection_file(&temp, SAWS)), 8);
}

#[test]
fn create_after_hand_edited_file_without_final_newline() {
    let temp = TempDir::new().unwrap();
    let service = service_in(&temp);
    let file = collection_file(&temp, DRILLS);
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, "id,name,price,stock,description\na,Hammer,1.00,1,").unwrap();

    let created = service.create(new_record(DRILLS, "Saw", 1.0, 1)).unwrap();

    let report = service.list_all_with_report().unwrap();
    assert!(report.warnings.is_empty());
    let ids: Vec<_> = report.records.iter().map(|r| r.record.id.as_str()).collect();
    assert_eq!(ids, vec!["a", created.record.id.as_str()]);
    assert_eq!(report.records[0].record.description, "");
}
