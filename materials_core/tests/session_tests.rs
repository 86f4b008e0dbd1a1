use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use materials_core::catalog;
use materials_core::config::{DownloaderConfig, EndpointContract};
use materials_core::delivery::file_delivery::FileDelivery;
use materials_core::downloader::material_downloader::MaterialDownloader;
use materials_core::notify::notice::Notice;
use materials_core::notify::observer::MaterialObserver;
use materials_core::session::{MaterialSession, SessionOutcome};
use materials_core::types::types::{DownloadRequest, FailureReason, MaterialId};

/// Records every callback as a short string.
#[derive(Clone, Default)]
struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl MaterialObserver for RecordingObserver {
    async fn on_start(&self, request: &DownloadRequest) {
        self.events.lock().unwrap().push(format!("start:{}", request.id));
    }

    async fn on_notice(&self, request: &DownloadRequest, notice: &Notice) {
        self.events
            .lock()
            .unwrap()
            .push(format!("notice:{}:{}", request.id, notice));
    }
}

fn session(
    uri: &str,
    contract: EndpointContract,
    delivery: FileDelivery,
) -> (MaterialSession, RecordingObserver) {
    let config = DownloaderConfig::builder(uri)
        .with_contract(contract)
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let downloader = Arc::new(MaterialDownloader::new(&config).unwrap());
    let mut session = MaterialSession::new(downloader, delivery);
    let observer = RecordingObserver::default();
    session.add_observer(Box::new(observer.clone()));
    (session, observer)
}

#[tokio::test]
async fn test_metadata_outcome_is_notified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("id", "articulation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Articulation Set",
            "size": "1.2MB",
            "message": "ok"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (session, observer) = session(
        &server.uri(),
        EndpointContract::Metadata,
        FileDelivery::new(dir.path().to_path_buf()),
    );
    let request = catalog::find("articulation").unwrap().download_request();

    let outcome = session.run(&request, &CancellationToken::new()).await;

    assert!(matches!(outcome, SessionOutcome::Metadata(ref m) if m.name == "Articulation Set"));
    assert_eq!(
        observer.events(),
        vec![
            "start:articulation".to_string(),
            "notice:articulation:📥 Articulation Set\n\nРазмер: 1.2MB\n\nok".to_string(),
        ]
    );
    // Metadata contract never touches the disk.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_binary_outcome_is_saved_to_download_dir() {
    let body = b"%PDF-1.4 games".to_vec();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("id", "games"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (session, observer) = session(
        &server.uri(),
        EndpointContract::Binary,
        FileDelivery::new(dir.path().to_path_buf()),
    );
    let request = catalog::find("games").unwrap().download_request();

    let outcome = session.run(&request, &CancellationToken::new()).await;

    let saved = match outcome {
        SessionOutcome::Saved(saved) => saved,
        other => panic!("expected saved, got {:?}", other),
    };
    assert_eq!(saved.path, dir.path().join("games.pdf"));
    assert_eq!(saved.bytes_written, body.len() as u64);
    assert_eq!(std::fs::read(&saved.path).unwrap(), body);

    // Only the delivered file remains; no staged leftovers.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    let events = observer.events();
    assert_eq!(events.len(), 2);
    assert!(events[1].starts_with("notice:games:📥 Логопедические игры → "));
}

#[tokio::test]
async fn test_repeated_binary_delivery_does_not_overwrite() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (session, _observer) = session(
        &server.uri(),
        EndpointContract::Binary,
        FileDelivery::new(dir.path().to_path_buf()),
    );
    let request = catalog::find("breathing").unwrap().download_request();
    let cancel = CancellationToken::new();

    let first = session.run(&request, &cancel).await;
    let second = session.run(&request, &cancel).await;

    match (first, second) {
        (SessionOutcome::Saved(a), SessionOutcome::Saved(b)) => {
            assert_eq!(a.path, dir.path().join("breathing.pdf"));
            assert_eq!(b.path, dir.path().join("breathing_2.pdf"));
        }
        other => panic!("expected two saves, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_binary_requests_for_one_material_both_save() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("id", "games"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8; 4 * 1024 * 1024]))
        .expect(4)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (session, observer) = session(
        &server.uri(),
        EndpointContract::Binary,
        FileDelivery::new(dir.path().to_path_buf()),
    );
    let request = catalog::find("games").unwrap().download_request();
    let cancel = CancellationToken::new();

    let outcomes =
        futures::future::join_all((0..4).map(|_| session.run(&request, &cancel))).await;

    let mut paths: Vec<_> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            SessionOutcome::Saved(saved) => saved.path,
            other => panic!("expected saved, got {:?}", other),
        })
        .collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 4);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    assert!(observer
        .events()
        .iter()
        .all(|event| !event.contains(FailureReason::NetworkError.user_message())));
}

#[tokio::test]
async fn test_delivery_failure_is_reported_and_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf".to_vec()))
        .mount(&server)
        .await;

    // The "download directory" is a regular file, so it can never be created.
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let (session, observer) = session(
        &server.uri(),
        EndpointContract::Binary,
        FileDelivery::new(blocker.clone()),
    );
    let request = catalog::find("workbooks").unwrap().download_request();

    let outcome = session.run(&request, &CancellationToken::new()).await;

    assert_eq!(outcome, SessionOutcome::Failed(FailureReason::NetworkError));
    assert_eq!(
        observer.events().last().unwrap(),
        "notice:workbooks:Произошла ошибка. Попробуйте позже."
    );
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_rejection_is_reported_generically() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "error": "Material not found" })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (session, observer) = session(
        &server.uri(),
        EndpointContract::Metadata,
        FileDelivery::new(dir.path().to_path_buf()),
    );
    let request = DownloadRequest::new(MaterialId::new("unknown-id").unwrap(), "Unknown");

    let outcome = session.run(&request, &CancellationToken::new()).await;

    assert_eq!(outcome, SessionOutcome::Failed(FailureReason::HttpError));
    assert_eq!(
        observer.events(),
        vec![
            "start:unknown-id".to_string(),
            "notice:unknown-id:Ошибка при скачивании материала".to_string(),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cancelled_request_delivers_no_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"pdf".to_vec())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (session, observer) = session(
        &server.uri(),
        EndpointContract::Binary,
        FileDelivery::new(dir.path().to_path_buf()),
    );
    let request = catalog::find("games").unwrap().download_request();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let outcome = session.run(&request, &cancel).await;

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(observer.events(), vec!["start:games".to_string()]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
