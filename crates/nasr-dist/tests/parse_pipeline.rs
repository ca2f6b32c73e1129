//! End-to-end record assembly tests across formats and policies

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{build_archive, csv_fixture_files, nav1_row, nav2_row, write_csv_fixture, write_fixed_fixture};
use nasr_dist::{
    DataStore, DecodeError, DistError, Distribution, LayoutFormat, ParseCoordinator, RecordKey,
    RecordType,
};
use std::sync::Arc;

async fn run_type(
    dist: &Arc<Distribution>,
    store: &DataStore,
    record_type: RecordType,
) -> nasr_dist::Result<nasr_dist::ParseReport> {
    ParseCoordinator::new(Arc::clone(dist), record_type)
        .run(store)
        .await
}

#[tokio::test]
async fn fixed_width_airport_assembly() {
    let dir = tempfile::tempdir().unwrap();
    write_fixed_fixture(dir.path());
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::FixedWidth).unwrap());
    let store = DataStore::new();

    let report = run_type(&dist, &store, RecordType::Airport).await.unwrap();
    assert_eq!(report.records, 2);
    // The orphaned remark was dropped and counted, never silently lost.
    assert_eq!(report.skipped_rows.get("APT.txt"), Some(&1));

    let set = store.get(RecordType::Airport).await.unwrap();
    let muni = set.get(&RecordKey::new(["04508.1", "A"])).unwrap();
    assert_eq!(muni.field("name"), Some("SPRINGFIELD MUNI"));
    assert_eq!(muni.field("state"), Some("IL"));
    assert_eq!(muni.section("runways").len(), 1);
    assert_eq!(muni.section("attendance").len(), 1);
    assert_eq!(muni.section("remarks").len(), 1);
    assert_eq!(
        muni.section("runways")[0].get("runway_id").map(String::as_str),
        Some("04/22")
    );

    let heli = set.get(&RecordKey::new(["19533.2", "H"])).unwrap();
    assert_eq!(heli.field("name"), Some("LAKESIDE HELI"));
    assert!(heli.section("runways").is_empty());
}

#[tokio::test]
async fn fixed_width_navaid_and_airway() {
    let dir = tempfile::tempdir().unwrap();
    write_fixed_fixture(dir.path());
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::FixedWidth).unwrap());
    let store = DataStore::new();

    let nav_report = run_type(&dist, &store, RecordType::Navaid).await.unwrap();
    assert_eq!(nav_report.records, 1);
    let navs = store.get(RecordType::Navaid).await.unwrap();
    let cap = navs.get(&RecordKey::new(["CAP", "VORTAC"])).unwrap();
    assert_eq!(cap.field("name"), Some("CAPITAL"));
    assert_eq!(cap.section("remarks").len(), 1);

    let awy_report = run_type(&dist, &store, RecordType::Airway).await.unwrap();
    assert_eq!(awy_report.records, 1);
    let airways = store.get(RecordType::Airway).await.unwrap();
    let v4 = airways.get(&RecordKey::new(["V4"])).unwrap();
    assert_eq!(v4.section("points").len(), 2);
}

#[tokio::test]
async fn fixed_width_orphan_fails_fast_by_policy() {
    let dir = tempfile::tempdir().unwrap();
    // NAV.txt is registered fail-fast; a remark for an unknown navaid must
    // abort the assembly.
    let nav = [
        nav1_row("CAP", "VORTAC", "CAPITAL", "SPRINGFIELD", "IL"),
        nav2_row("JOT", "VOR/DME", "ORPHANED REMARK"),
    ]
    .join("\r\n");
    std::fs::write(dir.path().join("NAV.txt"), nav + "\r\n").unwrap();
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::FixedWidth).unwrap());
    let store = DataStore::new();

    let err = run_type(&dist, &store, RecordType::Navaid).await.unwrap_err();
    match err {
        DistError::Decode { file, source } => {
            assert_eq!(file, "NAV.txt");
            assert!(matches!(source, DecodeError::UnknownParentRecord { .. }));
        },
        other => panic!("expected fail-fast decode error, got {other:?}"),
    }

    // Nothing was committed for the aborted type.
    assert!(store.get(RecordType::Navaid).await.is_none());
}

#[tokio::test]
async fn csv_airport_assembly_with_skipped_orphan() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixture(dir.path());
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::Csv).unwrap());
    let store = DataStore::new();

    let report = run_type(&dist, &store, RecordType::Airport).await.unwrap();
    assert_eq!(report.records, 2);
    assert_eq!(report.skipped_rows.get("APT_RMK.csv"), Some(&1));
    assert_eq!(report.skipped_rows.get("APT_RWY.csv"), None);

    let set = store.get(RecordType::Airport).await.unwrap();
    let muni = set.get(&RecordKey::new(["04508.1", "A"])).unwrap();
    assert_eq!(muni.field("ARPT_NAME"), Some("SPRINGFIELD MUNI"));
    assert_eq!(muni.section("runways").len(), 1);
    // The orphan attempt left the assembled record untouched.
    assert_eq!(muni.section("remarks").len(), 1);
    assert_eq!(
        muni.section("remarks")[0].get("REMARK").map(String::as_str),
        Some("DEER ON AND INVOF ARPT")
    );
}

#[tokio::test]
async fn csv_orphan_runway_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixture(dir.path());
    // Replace the runway file with one referencing an unknown site;
    // APT_RWY.csv is registered fail-fast.
    std::fs::write(
        dir.path().join("APT_RWY.csv"),
        "SITE_NO,SITE_TYPE_CODE,RWY_ID,RWY_LEN,SURFACE_TYPE_CODE\r\n77777.7,A,09/27,5000,TURF\r\n",
    )
    .unwrap();
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::Csv).unwrap());
    let store = DataStore::new();

    let err = run_type(&dist, &store, RecordType::Airport).await.unwrap_err();
    match err {
        DistError::Decode { file, source } => {
            assert_eq!(file, "APT_RWY.csv");
            assert!(matches!(source, DecodeError::UnknownParentRecord { .. }));
        },
        other => panic!("expected fail-fast decode error, got {other:?}"),
    }
    assert!(store.get(RecordType::Airport).await.is_none());
}

#[tokio::test]
async fn csv_distribution_from_archive_extracts_once_and_parses() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("28_Dec_2023_CSV.zip");
    let files = csv_fixture_files();
    let entries: Vec<(&str, &[u8])> = files
        .iter()
        .map(|(name, contents)| (*name, contents.as_bytes()))
        .collect();
    build_archive(&archive, &entries);

    let dist = Arc::new(Distribution::open_archive(&archive, LayoutFormat::Csv).unwrap());
    let store = DataStore::new();

    // Two record types against the same archived distribution; the scratch
    // extraction happens once and both parse from it.
    let airport = run_type(&dist, &store, RecordType::Airport).await.unwrap();
    let fix = run_type(&dist, &store, RecordType::Fix).await.unwrap();
    assert_eq!(airport.records, 2);
    assert_eq!(fix.records, 1);

    let cycle = dist.cycle().await.unwrap();
    assert_eq!(cycle.to_string(), "2023-12-28");
}

#[tokio::test]
async fn record_type_absent_from_format_is_empty_success() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixture(dir.path());
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::Csv).unwrap());
    let store = DataStore::new();

    // Airways are fixed-width only.
    let report = run_type(&dist, &store, RecordType::Airway).await.unwrap();
    assert_eq!(report.records, 0);
    assert!(report.skipped_rows.is_empty());
    let set = store.get(RecordType::Airway).await.unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn concurrent_record_types_share_one_distribution() {
    let dir = tempfile::tempdir().unwrap();
    write_fixed_fixture(dir.path());
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::FixedWidth).unwrap());
    let store = Arc::new(DataStore::new());

    let spawn_parse = |record_type: RecordType| {
        let dist = Arc::clone(&dist);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            ParseCoordinator::new(dist, record_type)
                .run(&store)
                .await
        })
    };

    let (airport, navaid, airway) = tokio::try_join!(
        spawn_parse(RecordType::Airport),
        spawn_parse(RecordType::Navaid),
        spawn_parse(RecordType::Airway),
    )
    .unwrap();

    assert_eq!(airport.unwrap().records, 2);
    assert_eq!(navaid.unwrap().records, 1);
    assert_eq!(airway.unwrap().records, 1);
}

#[tokio::test]
async fn missing_registered_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_csv_fixture(dir.path());
    std::fs::remove_file(dir.path().join("NAV_RMK.csv")).unwrap();
    let dist = Arc::new(Distribution::open_directory(dir.path(), LayoutFormat::Csv).unwrap());
    let store = DataStore::new();

    let err = run_type(&dist, &store, RecordType::Navaid).await.unwrap_err();
    assert!(matches!(err, DistError::ResourceNotFound(_)));
}
