use signpad::{
    DirectoryClient, Document, DocumentId, EngineConfig, Interaction, MemoryClient, PersistenceClient,
    PersistenceError, Point, SigningSession, Size, SubmissionBundle,
};

fn session() -> SigningSession {
    let mut session = SigningSession::new(EngineConfig::default()).unwrap();
    session
        .add_document(Document::new("lease-7", "https://example.com/lease-7.png", Size::new(400.0, 400.0)))
        .unwrap();
    session
        .add_document(Document::new(8u64, "https://example.com/8.png", Size::new(400.0, 400.0)))
        .unwrap();
    session
}

fn sign_everything(session: &mut SigningSession) {
    session.begin_stroke(Point::new(20.0, 100.0));
    session.extend_stroke(Point::new(300.0, 80.0));
    session.end_stroke();
    session.save_signature().unwrap();
    session.sign_current_document().unwrap();
}

#[test]
fn unsigned_bundle_json() {
    let mut session = session();
    assert!(matches!(
        session.pointer_down(Point::new(70.0, 70.0), "Ada Lovelace").unwrap(),
        Interaction::Placed(_)
    ));
    let bundle = session.bundle(&"lease-7".into()).unwrap();
    insta::assert_snapshot!(bundle.to_json().unwrap(), @r#"
    {
      "documentId": "lease-7",
      "imageRef": "https://example.com/lease-7.png",
      "fields": [
        {
          "id": 1,
          "x": 70.0,
          "y": 70.0,
          "width": 180.0,
          "height": 60.0,
          "ownerLabel": "Ada Lovelace",
          "signed": false
        }
      ]
    }
    "#);
}

#[test]
fn signed_bundle_round_trips() {
    let mut session = session();
    session.pointer_down(Point::new(70.0, 70.0), "Ada").unwrap();
    sign_everything(&mut session);

    let bundle = session.bundle(&"lease-7".into()).unwrap();
    let json = bundle.to_json().unwrap();
    assert!(json.contains("\"signatureImage\": \"data:image/png;base64,"));
    let back: SubmissionBundle = serde_json::from_str(&json).unwrap();
    assert_eq!(back, bundle);
}

#[tokio::test]
async fn memory_client_records_and_rejects() {
    let mut session = session();
    session.pointer_down(Point::new(70.0, 70.0), "Ada").unwrap();
    let client = MemoryClient::new();

    client.reject_next(1);
    let err = session.submit_current(&client).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Rejected { status: 503, .. }));
    // nothing rolled back locally
    assert_eq!(session.current().unwrap().len(), 1);

    let receipt = session.submit_current(&client).await.unwrap();
    assert_eq!(receipt.document_id, DocumentId::from("lease-7"));
    assert_eq!(client.submissions().len(), 1);

    // the session stays editable after submitting
    session.pointer_down(Point::new(70.0, 200.0), "Ada").unwrap();
    let receipts = session.submit_all(&client).await.unwrap();
    assert_eq!(receipts.len(), 2);
    assert_eq!(client.submissions().len(), 3);
    assert_eq!(client.submissions()[1].fields.len(), 2);
}

#[tokio::test]
async fn directory_client_writes_one_file_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().join("bundles")).unwrap();
    let client = DirectoryClient::new(root.clone());

    let mut session = session();
    session.pointer_down(Point::new(10.0, 10.0), "Ada").unwrap();
    sign_everything(&mut session);
    let receipts = session.submit_all(&client).await.unwrap();
    assert_eq!(receipts.len(), 2);

    let written = std::fs::read_to_string(root.join("lease-7.json")).unwrap();
    let bundle: SubmissionBundle = serde_json::from_str(&written).unwrap();
    assert!(bundle.fields[0].signed);
    assert!(bundle.signature_image.is_some());
    assert!(root.join("8.json").exists());
}

#[tokio::test]
async fn directory_client_rejects_unsafe_ids_and_large_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let sneaky = SubmissionBundle {
        document_id: "../escape".into(),
        image_ref: String::new(),
        fields: Vec::new(),
        signature_image: None,
    };
    let err = DirectoryClient::new(root.clone()).submit(&sneaky).await.unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidDocumentId(_)));

    let ok_id = SubmissionBundle { document_id: "fine".into(), ..sneaky };
    let err = DirectoryClient::new(root.clone()).with_limit(8).submit(&ok_id).await.unwrap_err();
    assert!(matches!(err, PersistenceError::PayloadTooLarge { limit: 8, .. }));
    assert!(!root.join("fine.json").exists());
}

#[tokio::test]
async fn submitting_without_documents_fails() {
    let session = SigningSession::new(EngineConfig::default()).unwrap();
    let err = session.submit_current(&MemoryClient::new()).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NoDocument));
}
