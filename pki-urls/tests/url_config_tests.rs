//! End-to-end behaviour of the `config/urls` read and write operations
//!
//! Every scenario runs against the in-memory backend (compare-and-swap
//! writes) and the filesystem backend (plain overwrites).

use pki_urls::*;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    handler: UrlConfigHandler,
    storage: Arc<dyn Storage>,
    _dir: Option<TempDir>,
}

fn memory_fixture() -> Fixture {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    Fixture {
        handler: UrlConfigHandler::new(ConfigStore::new(storage.clone())),
        storage,
        _dir: None,
    }
}

fn filesystem_fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileSystemStorage::new(dir.path()));
    Fixture {
        handler: UrlConfigHandler::new(ConfigStore::new(storage.clone())),
        storage,
        _dir: Some(dir),
    }
}

fn fixtures() -> Vec<Fixture> {
    vec![memory_fixture(), filesystem_fixture()]
}

async fn raw_record(storage: &Arc<dyn Storage>) -> Option<Vec<u8>> {
    storage
        .get(URLS_STORAGE_KEY)
        .await
        .unwrap()
        .map(|entry| entry.value)
}

#[tokio::test]
async fn test_first_read_returns_empty_result() {
    for fixture in fixtures() {
        let response = fixture.handler.read().await.unwrap();
        assert!(response.is_none(), "{}", fixture.storage.backend_name());
    }
}

#[tokio::test]
async fn test_write_then_read_round_trip() {
    for fixture in fixtures() {
        fixture
            .handler
            .write(&UrlConfigUpdate::new().with(UrlField::IssuingCertificates, "http://a,http://b"))
            .await
            .unwrap();

        let response = fixture.handler.read().await.unwrap().unwrap();
        assert_eq!(
            serde_json::Value::Object(response.data),
            json!({
                "issuing_certificates": ["http://a", "http://b"],
                "crl_distribution_points": [],
                "ocsp_servers": [],
            })
        );
    }
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields() {
    for fixture in fixtures() {
        let handler = &fixture.handler;
        handler
            .write(
                &UrlConfigUpdate::new()
                    .with(UrlField::IssuingCertificates, "http://ca.example.com/ca.pem")
                    .with(UrlField::CrlDistributionPoints, "http://crl.example.com/ca.crl"),
            )
            .await
            .unwrap();

        handler
            .write(&UrlConfigUpdate::new().with(UrlField::OcspServers, "http://ocsp.example.com"))
            .await
            .unwrap();

        let config = handler.store().load().await.unwrap().unwrap();
        assert_eq!(config.issuing_certificates, vec!["http://ca.example.com/ca.pem"]);
        assert_eq!(config.crl_distribution_points, vec!["http://crl.example.com/ca.crl"]);
        assert_eq!(config.ocsp_servers, vec!["http://ocsp.example.com"]);
    }
}

#[tokio::test]
async fn test_empty_string_clears_field() {
    for fixture in fixtures() {
        let handler = &fixture.handler;
        handler
            .write(
                &UrlConfigUpdate::new()
                    .with(UrlField::CrlDistributionPoints, "http://crl.example.com/ca.crl")
                    .with(UrlField::OcspServers, "http://ocsp.example.com"),
            )
            .await
            .unwrap();

        handler
            .write(&UrlConfigUpdate::new().with(UrlField::CrlDistributionPoints, ""))
            .await
            .unwrap();

        let response = handler.read().await.unwrap().unwrap();
        assert_eq!(response.data["crl_distribution_points"], json!([]));
        assert_eq!(response.data["ocsp_servers"], json!(["http://ocsp.example.com"]));
    }
}

#[tokio::test]
async fn test_invalid_url_leaves_record_byte_identical() {
    for fixture in fixtures() {
        fixture
            .handler
            .write(&UrlConfigUpdate::new().with(UrlField::OcspServers, "http://ocsp.example.com"))
            .await
            .unwrap();
        let before = raw_record(&fixture.storage).await;

        let err = fixture
            .handler
            .write(
                &UrlConfigUpdate::new()
                    .with(UrlField::IssuingCertificates, "http://ca.example.com")
                    .with(UrlField::OcspServers, "not a url!!"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UrlConfigError::Validation { field: UrlField::OcspServers, ref url, .. } if url == "not a url!!"
        ));
        assert_eq!(raw_record(&fixture.storage).await, before);
    }
}

#[tokio::test]
async fn test_invalid_url_on_first_write_creates_nothing() {
    for fixture in fixtures() {
        let err = fixture
            .handler
            .write(&UrlConfigUpdate::new().with(UrlField::CrlDistributionPoints, "http://"))
            .await
            .unwrap_err();

        assert!(err.is_user_error());
        assert!(raw_record(&fixture.storage).await.is_none());
        assert!(fixture.handler.read().await.unwrap().is_none());
    }
}

#[tokio::test]
async fn test_repeated_write_is_idempotent() {
    for fixture in fixtures() {
        let update = UrlConfigUpdate::new()
            .with(UrlField::IssuingCertificates, "http://ca.example.com/ca.pem")
            .with(UrlField::OcspServers, "http://ocsp.example.com");

        fixture.handler.write(&update).await.unwrap();
        let once = raw_record(&fixture.storage).await;

        fixture.handler.write(&update).await.unwrap();
        assert_eq!(raw_record(&fixture.storage).await, once);
    }
}

#[tokio::test]
async fn test_logical_request_surface() {
    for fixture in fixtures() {
        let data = json!({
            "issuing_certificates": "https://pki.example.com/v1/pki/ca",
            "crl_distribution_points": "https://pki.example.com/v1/pki/crl",
        });
        let response = fixture
            .handler
            .handle_request(&Request::write(URLS_PATH, data.as_object().unwrap().clone()))
            .await
            .unwrap();
        assert!(response.is_none());

        let data = json!({ "crl_distribution_points": "ftp://,https://ok.example.com" });
        let response = fixture
            .handler
            .handle_request(&Request::write(URLS_PATH, data.as_object().unwrap().clone()))
            .await
            .unwrap()
            .unwrap();
        assert!(response
            .error_message()
            .unwrap()
            .starts_with("invalid URL found in CRL distribution points; url is ftp://"));

        let response = fixture
            .handler
            .handle_request(&Request::read(URLS_PATH))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            response.data["crl_distribution_points"],
            json!(["https://pki.example.com/v1/pki/crl"])
        );
    }
}

#[tokio::test]
async fn test_record_written_by_older_version_is_readable() {
    let fixture = memory_fixture();
    fixture
        .storage
        .put(StorageEntry::new(
            URLS_STORAGE_KEY,
            br#"{"issuing_certificates":["http://ca.example.com"]}"#.to_vec(),
        ))
        .await
        .unwrap();

    fixture
        .handler
        .write(&UrlConfigUpdate::new().with(UrlField::OcspServers, "http://ocsp.example.com"))
        .await
        .unwrap();

    let config = fixture.handler.store().load().await.unwrap().unwrap();
    assert_eq!(config.issuing_certificates, vec!["http://ca.example.com"]);
    assert!(config.crl_distribution_points.is_empty());
    assert_eq!(config.ocsp_servers, vec!["http://ocsp.example.com"]);
}

#[tokio::test]
async fn test_trailing_comma_is_ignored() {
    for fixture in fixtures() {
        fixture
            .handler
            .write(&UrlConfigUpdate::new().with(UrlField::IssuingCertificates, "http://a,http://b,"))
            .await
            .unwrap();

        let config = fixture.handler.store().load().await.unwrap().unwrap();
        assert_eq!(config.issuing_certificates, vec!["http://a", "http://b"]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_filesystem_writes_are_last_writer_wins() {
    let dir = TempDir::new().unwrap();
    let handler = Arc::new(UrlConfigHandler::new(ConfigStore::new(Arc::new(
        FileSystemStorage::new(dir.path()),
    ))));
    handler
        .write(&UrlConfigUpdate::new().with(UrlField::IssuingCertificates, "http://ca.example.com"))
        .await
        .unwrap();

    let candidates: Vec<String> = (0..8)
        .map(|n| format!("http://ocsp{n}.example.com/{}", "p".repeat(2_000)))
        .collect();

    let reader = {
        let handler = handler.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                // Every observed record must decode
                handler.read().await.unwrap().unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let writers: Vec<_> = candidates
        .iter()
        .cloned()
        .map(|url| {
            let handler = handler.clone();
            tokio::spawn(async move {
                handler
                    .write(&UrlConfigUpdate::new().with(UrlField::OcspServers, url))
                    .await
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap().unwrap();
    }
    reader.await.unwrap();

    let config = handler.store().load().await.unwrap().unwrap();
    assert_eq!(config.ocsp_servers.len(), 1);
    assert!(candidates.contains(&config.ocsp_servers[0]));
    assert_eq!(config.issuing_certificates, vec!["http://ca.example.com"]);

    // A write that starts after the others finished is the one that sticks
    handler
        .write(&UrlConfigUpdate::new().with(UrlField::OcspServers, "http://final.example.com"))
        .await
        .unwrap();
    let config = handler.store().load().await.unwrap().unwrap();
    assert_eq!(config.ocsp_servers, vec!["http://final.example.com"]);
}
