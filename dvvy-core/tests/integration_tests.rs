//! Integration tests for dvvy-core services
//!
//! These tests run the services against a real DuckDB file in a temp dir.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use dvvy_core::adapters::duckdb::DuckDbRepository;
use dvvy_core::domain::{Expense, Group, Member, Split, SplitType};
use dvvy_core::ports::GroupRepository;
use dvvy_core::services::{
    ExpenseInput, GroupService, ImportOptions, ImportService, SplitRequest, StatusService,
    SummaryService,
};
use dvvy_core::services::import::parse_groups;
use dvvy_core::DvvyContext;

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a test repository with schema initialized
fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let db_path = temp_dir.path().join("test.duckdb");
    let repo = DuckDbRepository::new(&db_path).expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

fn group_service(repo: &Arc<DuckDbRepository>) -> GroupService {
    GroupService::new(repo.clone())
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn equal_expense(description: &str, amount: i64, payer: &str) -> ExpenseInput {
    ExpenseInput {
        description: description.to_string(),
        amount: Decimal::from(amount),
        date: date(1),
        paid_by: payer.to_string(),
        split: SplitRequest::Equal,
    }
}

/// Group with members A, B, C and nothing spent
fn abc_group(service: &GroupService) -> Group {
    service
        .create_group(
            "Flat 4B",
            &["A".to_string(), "B".to_string(), "C".to_string()],
        )
        .unwrap()
}

fn id_of(group: &Group, name: &str) -> String {
    GroupService::resolve_member(group, name).unwrap().id.clone()
}

// ============================================================================
// Repository Round Trip Tests
// ============================================================================

/// A stored group comes back with members and expenses in insertion order
#[test]
fn test_group_round_trip_preserves_order() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let mut group = Group::new(
        "Trip",
        vec![
            Member::new("z", "Zed"),
            Member::new("a", "Amy"),
            Member::new("m", "Max"),
        ],
    );
    for (i, payer) in ["m", "z", "a"].iter().enumerate() {
        group.expenses.push(Expense::new(
            format!("Expense {}", i),
            cents(1001),
            date(3 - i as u32),
            *payer,
            SplitType::Unequal,
            vec![Split::new("z", cents(500)), Split::new("m", cents(501))],
        ));
    }
    repo.create_group(&group).unwrap();

    let loaded = repo.get_group(&group.id).unwrap().unwrap();
    assert_eq!(loaded.members, group.members);
    assert_eq!(loaded.expenses, group.expenses);
    assert_eq!(loaded.created_at.timestamp(), group.created_at.timestamp());
}

/// Decimal amounts survive storage exactly
#[test]
fn test_amounts_round_trip_exactly() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let mut group = Group::new("Exact", vec![Member::new("a", "A"), Member::new("b", "B")]);
    group.expenses.push(Expense::new(
        "Odd",
        Decimal::new(1000001, 3),
        date(1),
        "a",
        SplitType::Unequal,
        vec![Split::new("b", Decimal::new(1000001, 3))],
    ));
    repo.create_group(&group).unwrap();

    let loaded = repo.get_group(&group.id).unwrap().unwrap();
    assert_eq!(loaded.expenses[0].amount, Decimal::new(1000001, 3));
    assert_eq!(loaded.expenses[0].splits[0].amount, Decimal::new(1000001, 3));
}

#[test]
fn test_get_missing_group_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    assert!(repo.get_group("nope").unwrap().is_none());
}

/// Deleting a group removes its members, expenses and splits
#[test]
fn test_delete_group_cascades() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);

    let keep = abc_group(&service);
    let doomed = service
        .create_group("Doomed", &["X".to_string(), "Y".to_string()])
        .unwrap();
    let x = id_of(&doomed, "X");
    service
        .add_expense(&doomed.id, equal_expense("Pizza", 20, &x))
        .unwrap();

    service.delete_group(&doomed.id).unwrap();

    let (groups, members, expenses) = repo.counts().unwrap();
    assert_eq!(groups, 1);
    assert_eq!(members, 3);
    assert_eq!(expenses, 0);
    assert!(repo.get_group(&keep.id).unwrap().is_some());
    assert!(service.delete_group(&doomed.id).is_err());
}

/// Update and delete of an unknown expense are NotFound
#[test]
fn test_unknown_expense_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);

    let ghost = Expense::new("Ghost", cents(100), date(1), "a", SplitType::Equal, vec![]);
    let err = repo.update_expense(&group.id, &ghost).unwrap_err();
    assert!(matches!(err, dvvy_core::Error::NotFound(_)));

    let err = repo.delete_expense(&group.id, "ghost").unwrap_err();
    assert!(matches!(err, dvvy_core::Error::NotFound(_)));
}

/// Data persists across repository instances
#[test]
fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let group_id = {
        let repo = create_test_repo(&temp_dir);
        abc_group(&group_service(&repo)).id
    };

    let repo = create_test_repo(&temp_dir);
    let group = repo.get_group(&group_id).unwrap().unwrap();
    assert_eq!(group.members.len(), 3);

    let result = repo.run_migrations().unwrap();
    assert!(result.applied.is_empty());
}

// ============================================================================
// Group Service Tests
// ============================================================================

#[test]
fn test_create_group_validation() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);

    assert!(service.create_group("  ", &["A".to_string()]).is_err());
    assert!(service.create_group("Empty", &[]).is_err());
    assert!(service
        .create_group("Blank member", &["A".to_string(), " ".to_string()])
        .is_err());

    let group = service
        .create_group(" Trimmed ", &[" Asha ".to_string()])
        .unwrap();
    assert_eq!(group.name, "Trimmed");
    assert_eq!(group.members[0].name, "Asha");
}

#[test]
fn test_find_group_by_id_or_name() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);

    assert_eq!(service.find_group(&group.id).unwrap().id, group.id);
    assert_eq!(service.find_group("flat 4b").unwrap().id, group.id);
    assert!(service.find_group("Flat 5C").is_err());

    abc_group(&service);
    assert!(service.find_group("Flat 4B").is_err());
}

#[test]
fn test_add_member_then_split_includes_them() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);

    let d = service.add_member(&group.id, "D").unwrap();
    let a = id_of(&group, "A");
    let expense = service
        .add_expense(&group.id, equal_expense("Groceries", 100, &a))
        .unwrap();

    assert_eq!(expense.splits.len(), 4);
    assert!(expense.splits.iter().any(|s| s.member_id == d.id));
    assert!(service.add_member("missing", "E").is_err());
}

#[test]
fn test_edit_expense_keeps_id_and_position() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);
    let a = id_of(&group, "A");
    let b = id_of(&group, "B");

    let first = service.add_expense(&group.id, equal_expense("First", 30, &a)).unwrap();
    service.add_expense(&group.id, equal_expense("Second", 60, &a)).unwrap();

    let edited = service
        .edit_expense(
            &group.id,
            &first.id,
            ExpenseInput {
                description: "First, fixed".to_string(),
                amount: Decimal::from(40),
                date: date(2),
                paid_by: b.clone(),
                split: SplitRequest::Unequal {
                    amounts: HashMap::from([(a.clone(), Decimal::from(40))]),
                },
            },
        )
        .unwrap();
    assert_eq!(edited.id, first.id);

    let loaded = service.find_group(&group.id).unwrap();
    assert_eq!(loaded.expenses[0].id, first.id);
    assert_eq!(loaded.expenses[0].description, "First, fixed");
    assert_eq!(loaded.expenses[0].paid_by, b);
    assert_eq!(loaded.expenses[0].split_type, SplitType::Unequal);
    assert_eq!(loaded.expenses[0].splits, vec![Split::new(a, Decimal::from(40))]);
    assert_eq!(loaded.expenses[1].description, "Second");

    assert!(service
        .edit_expense(&group.id, "missing", equal_expense("X", 1, &b))
        .is_err());
}

#[test]
fn test_delete_expense() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);
    let a = id_of(&group, "A");

    let expense = service.add_expense(&group.id, equal_expense("Once", 30, &a)).unwrap();
    service.delete_expense(&group.id, &expense.id).unwrap();

    assert!(service.find_group(&group.id).unwrap().expenses.is_empty());
    assert!(service.delete_expense(&group.id, &expense.id).is_err());
}

#[test]
fn test_unequal_split_must_add_up() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);
    let a = id_of(&group, "A");
    let b = id_of(&group, "B");

    let result = service.add_expense(
        &group.id,
        ExpenseInput {
            description: "Off by a rupee".to_string(),
            amount: Decimal::from(100),
            date: date(1),
            paid_by: a.clone(),
            split: SplitRequest::Unequal {
                amounts: HashMap::from([(a, Decimal::from(50)), (b, Decimal::from(49))]),
            },
        },
    );
    assert!(result.is_err());
    assert!(service.find_group(&group.id).unwrap().expenses.is_empty());
}

// ============================================================================
// Summary Tests
// ============================================================================

/// One payer covering the whole group: everyone else pays them back
#[test]
fn test_summary_single_payer() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);
    let (a, b, c) = (id_of(&group, "A"), id_of(&group, "B"), id_of(&group, "C"));

    service.add_expense(&group.id, equal_expense("Dinner", 90, &a)).unwrap();

    let summary = SummaryService::new(repo.clone()).get_summary(&group.id).unwrap();
    let amounts: Vec<Decimal> = summary.balances.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![Decimal::from(60), Decimal::from(-30), Decimal::from(-30)]);

    assert_eq!(summary.settlements.len(), 2);
    assert_eq!((summary.settlements[0].from.as_str(), summary.settlements[0].to.as_str()), (b.as_str(), a.as_str()));
    assert_eq!((summary.settlements[1].from.as_str(), summary.settlements[1].to.as_str()), (c.as_str(), a.as_str()));
    assert!(summary.settlements.iter().all(|s| s.amount == Decimal::from(30)));

    assert_eq!(summary.group_stats.total_expenses, Decimal::from(90));
    assert_eq!(summary.timeline.len(), 1);
}

/// Paying back with a reverse expense clears the sheet
#[test]
fn test_summary_after_settling_up() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = service
        .create_group("Pair", &["A".to_string(), "B".to_string()])
        .unwrap();
    let a = id_of(&group, "A");
    let b = id_of(&group, "B");

    service.add_expense(&group.id, equal_expense("Taxi", 50, &a)).unwrap();
    service
        .add_expense(
            &group.id,
            ExpenseInput {
                description: "Paid back".to_string(),
                amount: Decimal::from(25),
                date: date(2),
                paid_by: b,
                split: SplitRequest::Select {
                    member_ids: vec![a],
                },
            },
        )
        .unwrap();

    let summary = SummaryService::new(repo.clone()).get_summary(&group.id).unwrap();
    assert!(summary.all_settled());
    assert!(summary.tabs.is_empty());
    assert!(summary.balances.iter().all(|b| b.is_settled()));
}

#[test]
fn test_summary_of_missing_group_fails() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    assert!(SummaryService::new(repo).get_summary("missing").is_err());
}

// ============================================================================
// Import Tests
// ============================================================================

const EXPORTED_GROUPS: &str = r#"[
  {
    "id": "q8w7e6r5t",
    "name": "Hostel",
    "members": [{"id": "m1", "name": "Anu"}, {"id": "m2", "name": "Bo"}],
    "expenses": [
      {"id": "e1", "description": "Wifi", "amount": 999, "date": "2024-02-01",
       "paidBy": "m1", "splitType": "equal",
       "splits": [{"memberId": "m1", "amount": 499.5}, {"memberId": "m2", "amount": 499.5}]}
    ],
    "createdAt": "2024-02-01T08:00:00.000Z"
  },
  {
    "id": "z1x2c3v4b",
    "name": "Empty",
    "members": [{"id": "m9", "name": "Solo"}],
    "expenses": [],
    "createdAt": "2024-02-02T08:00:00.000Z"
  }
]"#;

#[test]
fn test_import_keeps_ids() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());

    let result = import.import(EXPORTED_GROUPS, &ImportOptions::default()).unwrap();
    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.replaced, 0);

    let hostel = repo.get_group("q8w7e6r5t").unwrap().unwrap();
    assert_eq!(hostel.expenses[0].splits[1].amount, cents(49950));

    let summary = SummaryService::summarize(&hostel);
    assert_eq!(summary.settlements.len(), 1);
    assert_eq!(summary.settlements[0].from, "m2");
    assert_eq!(summary.settlements[0].amount, cents(49950));
}

#[test]
fn test_import_duplicate_needs_replace() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());

    import.import(EXPORTED_GROUPS, &ImportOptions::default()).unwrap();
    assert!(import.import(EXPORTED_GROUPS, &ImportOptions::default()).is_err());

    let result = import
        .import(
            EXPORTED_GROUPS,
            &ImportOptions {
                replace: true,
                preview_only: false,
            },
        )
        .unwrap();
    assert_eq!(result.replaced, 2);
    assert_eq!(repo.counts().unwrap().0, 2);
}

#[test]
fn test_import_collision_stores_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());

    // Only the second group of the batch is already stored
    let groups = parse_groups(EXPORTED_GROUPS).unwrap();
    repo.create_group(&groups[1]).unwrap();

    let err = import.import(EXPORTED_GROUPS, &ImportOptions::default()).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert!(repo.get_group("q8w7e6r5t").unwrap().is_none());
    assert_eq!(repo.counts().unwrap().0, 1);
}

#[test]
fn test_failed_replace_keeps_stored_groups() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());
    import.import(EXPORTED_GROUPS, &ImportOptions::default()).unwrap();

    let mut groups = parse_groups(EXPORTED_GROUPS).unwrap();
    groups[0].name = "Hostel, renamed".to_string();
    // Two members sharing an id break the member primary key mid-transaction
    groups[1].members = vec![Member::new("m9", "Solo"), Member::new("m9", "Twin")];

    assert!(repo.save_groups(&groups).is_err());

    let hostel = repo.get_group("q8w7e6r5t").unwrap().unwrap();
    assert_eq!(hostel.name, "Hostel");
    assert_eq!(hostel.expenses.len(), 1);
    let empty = repo.get_group("z1x2c3v4b").unwrap().unwrap();
    assert_eq!(empty.members, vec![Member::new("m9", "Solo")]);
}

#[test]
fn test_replace_with_invalid_group_keeps_original() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());
    import.import(EXPORTED_GROUPS, &ImportOptions::default()).unwrap();

    let duplicate_members = r#"{
        "id": "z1x2c3v4b",
        "name": "Empty",
        "members": [{"id": "a", "name": "Asha"}, {"id": "a", "name": "Ravi"}]
    }"#;
    let replace = ImportOptions {
        replace: true,
        preview_only: false,
    };
    assert!(import.import(duplicate_members, &replace).is_err());

    let kept = repo.get_group("z1x2c3v4b").unwrap().unwrap();
    assert_eq!(kept.members[0].name, "Solo");
}

#[test]
fn test_import_rejects_unknown_members() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());

    let ghost_payer = EXPORTED_GROUPS.replace("\"paidBy\": \"m1\"", "\"paidBy\": \"ghost\"");
    assert!(import.import(&ghost_payer, &ImportOptions::default()).is_err());

    let ghost_split = EXPORTED_GROUPS.replace("{\"memberId\": \"m2\"", "{\"memberId\": \"nobody\"");
    assert!(import.import(&ghost_split, &ImportOptions::default()).is_err());

    assert_eq!(repo.counts().unwrap().0, 0);
}

#[test]
fn test_import_preview_stores_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let import = ImportService::new(repo.clone());

    let result = import
        .import(
            EXPORTED_GROUPS,
            &ImportOptions {
                replace: false,
                preview_only: true,
            },
        )
        .unwrap();
    assert!(result.preview);
    assert_eq!(repo.counts().unwrap().0, 0);
}

// ============================================================================
// Status and Context Tests
// ============================================================================

#[test]
fn test_status_totals() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let service = group_service(&repo);
    let group = abc_group(&service);
    let a = id_of(&group, "A");
    service.add_expense(&group.id, equal_expense("One", 30, &a)).unwrap();
    service.add_expense(&group.id, equal_expense("Two", 45, &a)).unwrap();

    let status = StatusService::new(repo.clone()).get_status().unwrap();
    assert_eq!(status.total_groups, 1);
    assert_eq!(status.total_members, 3);
    assert_eq!(status.total_expenses, 2);
    assert_eq!(status.total_spend, Decimal::from(75));
    assert_eq!(status.groups[0].open_settlements, 2);
}

#[test]
fn test_context_uses_regular_database() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DvvyContext::new(temp_dir.path()).unwrap();
    assert_eq!(ctx.repository.db_path(), temp_dir.path().join(ctx.config.db_filename()));

    let group = ctx
        .group_service
        .create_group("Ctx", &["Solo".to_string()])
        .unwrap();
    let summary = ctx.summary_service.get_summary(&group.id).unwrap();
    assert!(summary.all_settled());
}
