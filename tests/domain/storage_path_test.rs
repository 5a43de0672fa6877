use talk_catalog::domain::{ImportJobId, STAGED_IMPORT_PREFIX, StoragePath};

#[test]
fn given_job_id_when_building_staged_path_then_follows_naming_convention() {
    let id = ImportJobId::new();

    let path = StoragePath::staged_import(&id);

    assert_eq!(path.as_str(), format!("csv-import-{}.csv", id.as_uuid()));
    assert!(path.as_str().starts_with(STAGED_IMPORT_PREFIX));
}

#[test]
fn given_two_jobs_when_building_staged_paths_then_paths_differ() {
    let a = StoragePath::staged_import(&ImportJobId::new());
    let b = StoragePath::staged_import(&ImportJobId::new());

    assert_ne!(a, b);
}

#[test]
fn given_nested_staged_name_when_checking_then_recognized_by_last_segment() {
    assert!(StoragePath::from_raw("tmp/csv-import-1.csv").is_staged_import());
    assert!(!StoragePath::from_raw("csv-import/other.csv").is_staged_import());
    assert!(!StoragePath::from_raw("talks.csv").is_staged_import());
}
