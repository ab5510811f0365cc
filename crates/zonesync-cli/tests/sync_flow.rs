//! End-to-end sync flow over HTTP
//!
//! Runs the real engine against the real storage adapter, with wiremock
//! standing in for the Edge Storage API. Complements the engine's own
//! integration tests (which use an in-memory backend) by covering the
//! full walker → pipeline → HTTP path.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zonesync_engine::{SyncConfig, SyncEngine, SyncReporter};
use zonesync_storage::StorageClient;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("buffer lock").clone()).expect("utf8 output")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn engine_for(server: &MockServer, buffer: &SharedBuffer, dry_run: bool) -> SyncEngine {
    let client = StorageClient::new(server.uri(), "testzone", "test-key");
    let reporter = SyncReporter::new(Box::new(buffer.clone()));
    let config = SyncConfig {
        dry_run,
        ..SyncConfig::default()
    };
    SyncEngine::new(Arc::new(client), reporter, config, CancellationToken::new())
}

#[tokio::test]
async fn test_sync_uploads_tree_into_empty_zone() {
    let server = MockServer::start().await;

    // Empty remote zone.
    Mock::given(method("GET"))
        .and(path("/testzone/"))
        .and(header("AccessKey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    // Every upload must arrive exactly once, as a PUT answered with 201.
    for file in ["file1", "nd1/file2", "nd2/nd21/file3"] {
        Mock::given(method("PUT"))
            .and(path(format!("/testzone/{file}")))
            .and(header("AccessKey", "test-key"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    for file in ["file1", "nd1/file2", "nd2/nd21/file3"] {
        let full = dir.path().join(file);
        std::fs::create_dir_all(full.parent().expect("parent")).expect("mkdir");
        std::fs::write(&full, file.as_bytes()).expect("write");
    }

    let buffer = SharedBuffer::default();
    let summary = engine_for(&server, &buffer, false)
        .run(dir.path())
        .await
        .expect("sync failed");

    assert_eq!(summary.files_uploaded, 3);
    assert_eq!(summary.files_deleted, 0);

    let output: BTreeSet<String> = buffer.contents().lines().map(str::to_string).collect();
    assert_eq!(
        output,
        BTreeSet::from([
            "+ file1".to_string(),
            "+ nd1/file2".to_string(),
            "+ nd2/nd21/file3".to_string(),
        ])
    );
}

#[tokio::test]
async fn test_sync_deletes_stale_remote_files() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/testzone/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ObjectName": "stale1",
                "Path": "/testzone/",
                "IsDirectory": false,
                "Checksum": "AAAA"
            },
            {
                "ObjectName": "nd1",
                "Path": "/testzone/",
                "IsDirectory": true,
                "Checksum": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/testzone/nd1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ObjectName": "stale2",
                "Path": "/testzone/nd1/",
                "IsDirectory": false,
                "Checksum": "BBBB"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex("^/testzone/(stale1|nd1/stale2)$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let buffer = SharedBuffer::default();
    let summary = engine_for(&server, &buffer, false)
        .run(dir.path())
        .await
        .expect("sync failed");

    assert_eq!(summary.files_deleted, 2);
    let output: BTreeSet<String> = buffer.contents().lines().map(str::to_string).collect();
    assert_eq!(
        output,
        BTreeSet::from(["- stale1".to_string(), "- nd1/stale2".to_string()])
    );
}

#[tokio::test]
async fn test_dry_run_never_mutates_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/testzone/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "ObjectName": "stale",
                "Path": "/testzone/",
                "IsDirectory": false,
                "Checksum": "AAAA"
            }
        ])))
        .mount(&server)
        .await;

    // No PUT/DELETE mock is mounted: any mutating request would 404 and
    // fail the run.
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("new-file"), b"content").expect("write");

    let buffer = SharedBuffer::default();
    let summary = engine_for(&server, &buffer, true)
        .run(dir.path())
        .await
        .expect("dry run failed");

    assert_eq!(summary.files_uploaded, 1);
    assert_eq!(summary.files_deleted, 1);
    let output: BTreeSet<String> = buffer.contents().lines().map(str::to_string).collect();
    assert_eq!(
        output,
        BTreeSet::from(["+ new-file".to_string(), "- stale".to_string()])
    );
}
