mod common;

use axum::{body::to_bytes, http::StatusCode};
use serde_json::json;
use xti_admin_api::auth::Role;

use common::TestApp;

#[tokio::test]
async fn serves_uploaded_file_with_inferred_content_type() {
    let app = TestApp::new();
    std::fs::write(app.upload_dir.join("invoice.pdf"), b"%PDF-1.4 test").unwrap();
    let token = app.token("alice", Role::Viewer);

    let response = app.raw("GET", "/api/files/invoice.pdf", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert_eq!(
        response.headers()["content-disposition"],
        "inline; filename=\"invoice.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 test");
}

#[tokio::test]
async fn unknown_extension_is_served_as_octet_stream() {
    let app = TestApp::new();
    std::fs::write(app.upload_dir.join("blob.xyz123"), b"raw").unwrap();
    let token = app.token("alice", Role::Viewer);

    let response = app.raw("GET", "/api/files/blob.xyz123", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/octet-stream");
}

#[tokio::test]
async fn file_names_cannot_escape_upload_directory() {
    let app = TestApp::new();
    let token = app.token("alice", Role::Viewer);

    for uri in [
        "/api/files/..%2Fsecret.txt",
        "/api/files/.env",
        "/api/files/a%5Cb.txt",
        "/api/files/a%22b.pdf",
        "/api/files/a%0Db.pdf",
    ] {
        let (status, _) = app.call("GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} should be rejected", uri);
    }
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let app = TestApp::new();
    let token = app.token("alice", Role::Viewer);

    let (status, body) = app.call("GET", "/api/files/nothing.pdf", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap_or_default().contains("nothing.pdf"));
}

#[tokio::test]
async fn admin_can_send_mail() {
    let app = TestApp::new();
    let token = app.admin();
    let message = json!({ "to": "ops@example.com", "subject": "Report", "text": "Done" });

    let (status, body) = app.call("POST", "/api/mail", Some(&token), Some(message)).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, json!({ "message": "Email sent" }));
    let sent = app.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ops@example.com");
}

#[tokio::test]
async fn mail_rejects_bad_recipient_and_non_admins() {
    let app = TestApp::new();

    let admin = app.admin();
    let (status, _) = app
        .call(
            "POST",
            "/api/mail",
            Some(&admin),
            Some(json!({ "to": "not-an-address", "subject": "s", "text": "t" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let viewer = app.token("alice", Role::Viewer);
    let (status, _) = app
        .call(
            "POST",
            "/api/mail",
            Some(&viewer),
            Some(json!({ "to": "ops@example.com", "subject": "s", "text": "t" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert!(app.mailer.sent.lock().unwrap().is_empty());
}
