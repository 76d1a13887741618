use super::*;
use crate::test_support::{row, FakeFetcher, MemorySheet, RecordingStore};

fn setup(sheet: MemorySheet, work_dir: &std::path::Path) -> (Arc<MemorySheet>, Arc<RecordingStore>, SheetSync) {
    let sheet = Arc::new(sheet);
    let store = Arc::new(RecordingStore::default());
    let processor = Arc::new(VideoProcessor::new(
        vec![Arc::new(FakeFetcher { prefix: "https://" })],
        store.clone(),
        work_dir,
    ));
    (sheet.clone(), store, SheetSync::new(sheet, processor))
}

#[test]
fn test_link_names() {
    assert_eq!(link_name("Sneakers", 1), "Sneakers");
    assert_eq!(link_name("Sneakers", 2), "Sneakers (2)");
    assert_eq!(link_name("Sneakers", 10), "Sneakers (10)");
}

#[tokio::test]
async fn test_all_links_done() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, store, sync) = setup(
        MemorySheet {
            rows: vec![row(2, "Sneakers", &["https://a.example/1", "https://a.example/2"])],
            ..Default::default()
        },
        dir.path(),
    );

    let report = sync.run(None).await.unwrap();
    assert!(report.success);
    assert_eq!(report.count, 1);

    let row = &report.results[0];
    assert_eq!(row.status, RowStatus::Done);
    assert_eq!(row.links_count, 2);
    assert_eq!(row.items[0].filename, "Sneakers.mp4");
    assert_eq!(row.items[1].filename, "Sneakers (2).mp4");
    assert_eq!(
        row.drive_links,
        vec![
            "https://drive.google.com/file/d/file-1/view",
            "https://drive.google.com/file/d/file-2/view"
        ]
    );

    let uploads = store.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 2);

    let writes = sheet.writes.lock().unwrap();
    assert_eq!(
        writes[0],
        (
            2,
            "https://drive.google.com/file/d/file-1/view\nhttps://drive.google.com/file/d/file-2/view"
                .to_string(),
            RowStatus::Done
        )
    );
}

#[tokio::test]
async fn test_failed_link_marks_partial() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, _store, sync) = setup(
        MemorySheet {
            rows: vec![row(
                5,
                "Lamp",
                &["https://broken.example/1", "https://a.example/2"],
            )],
            ..Default::default()
        },
        dir.path(),
    );

    let report = sync.run(None).await.unwrap();
    let row = &report.results[0];
    assert_eq!(row.status, RowStatus::Partial);
    assert_eq!(row.drive_links.len(), 1);

    let failed = &row.items[0];
    assert!(!failed.success);
    assert_eq!(failed.filename, "Lamp.mp4");
    assert_eq!(failed.error.as_deref(), Some("yt-dlp failed"));
    assert!(failed.drive_file.is_none());
    assert!(row.items[1].success);

    let writes = sheet.writes.lock().unwrap();
    assert_eq!(writes[0].0, 5);
    assert_eq!(writes[0].1, "https://drive.google.com/file/d/file-1/view");
    assert_eq!(writes[0].2, RowStatus::Partial);
}

#[tokio::test]
async fn test_limit_truncates_rows() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        row(2, "a", &["https://a.example/1"]),
        row(3, "b", &["https://a.example/2"]),
        row(4, "c", &["https://a.example/3"]),
    ];

    let (sheet, _, sync) = setup(MemorySheet { rows: rows.clone(), ..Default::default() }, dir.path());
    let report = sync.run(Some(2)).await.unwrap();
    assert_eq!(report.count, 2);
    assert_eq!(sheet.writes.lock().unwrap().len(), 2);

    // Zero means no limit.
    let (_, _, sync) = setup(MemorySheet { rows, ..Default::default() }, dir.path());
    assert_eq!(sync.run(Some(0)).await.unwrap().count, 3);
}

#[tokio::test]
async fn test_empty_queue() {
    let dir = tempfile::tempdir().unwrap();
    let (sheet, _, sync) = setup(MemorySheet::default(), dir.path());

    let report = sync.run(Some(5)).await.unwrap();
    assert_eq!(report.count, 0);
    assert!(report.results.is_empty());
    assert!(sheet.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_read_failure_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, sync) = setup(
        MemorySheet {
            fail_reads: true,
            ..Default::default()
        },
        dir.path(),
    );
    assert!(matches!(sync.run(None).await, Err(PipelineError::Google(_))));
}

#[tokio::test]
async fn test_write_failure_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let (_, store, sync) = setup(
        MemorySheet {
            rows: vec![
                row(2, "a", &["https://a.example/1"]),
                row(3, "b", &["https://a.example/2"]),
            ],
            fail_writes: true,
            ..Default::default()
        },
        dir.path(),
    );

    assert!(sync.run(None).await.is_err());
    // Stops after the first row's write-back.
    assert_eq!(store.uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, sync) = setup(
        MemorySheet {
            rows: vec![row(2, "x", &["https://a.example/1", "https://broken.example/2"])],
            ..Default::default()
        },
        dir.path(),
    );

    let report = serde_json::to_value(sync.run(None).await.unwrap()).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["count"], 1);

    let row = &report["results"][0];
    assert_eq!(row["row_index"], 2);
    assert_eq!(row["status"], "PARTIAL");
    assert_eq!(row["links_count"], 2);
    assert_eq!(row["items"][0]["drive_file"]["id"], "file-1");
    assert!(row["items"][0].get("error").is_none());
    assert_eq!(row["items"][1]["error"], "yt-dlp failed");
    assert!(row["items"][1].get("drive_file").is_none());
}
