use std::net::TcpListener;

use docbatch_client::{ClientConfig, HttpClient};
use docbatch_core::{DealId, DocumentId, TransportError};
use docbatch_ops::{ArchiveRequest, BulkOperationCoordinator, BulkOutcome, NetworkClient};

/// A base URL nothing is listening on.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api/")
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let client = HttpClient::new(&ClientConfig::new(closed_port_url())).unwrap();

    let err = client
        .archive_documents(
            &DealId::new("deal-1"),
            ArchiveRequest {
                document_ids: vec![DocumentId::new("doc-1")],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Connection { .. }), "{err:?}");
}

#[tokio::test]
async fn test_coordinator_rolls_back_when_server_unreachable() {
    let client = HttpClient::new(&ClientConfig::new(closed_port_url())).unwrap();
    let coordinator = BulkOperationCoordinator::new("deal-1", client);

    let outcome = coordinator
        .on_bulk_delete(vec![docbatch_core::DocumentRef::new("doc-1", "a.pdf", None)])
        .await;

    assert!(matches!(outcome, BulkOutcome::RolledBack(_)));
    assert_eq!(
        coordinator.toast().unwrap().text,
        "Failed to delete documents"
    );
}
