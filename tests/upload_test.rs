//! Multipart uploads through the full handler.

use axum::http::StatusCode;
use serde_json::json;

use graphql_vercel::config::{HandlerConfig, UploadConfig};
use graphql_vercel::GraphQLHandler;

mod common;

use common::FilePart;

fn notes() -> FilePart<'static> {
    FilePart {
        filename: "notes.txt",
        content_type: "text/plain",
        contents: "remember the milk",
    }
}

#[tokio::test]
async fn test_single_upload_returns_file_metadata() {
    let handler = common::handler(HandlerConfig::default());
    let body = common::multipart_body(
        &json!({
            "query": "mutation($file: Upload!) { singleUpload(file: $file) { filename mimetype encoding } }",
            "variables": { "file": null },
        }),
        &json!({ "0": ["variables.file"] }),
        &[notes()],
    );

    let response = common::send(&handler, common::post_multipart("/", body)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({
            "data": {
                "singleUpload": {
                    "filename": "notes.txt",
                    "mimetype": "text/plain",
                    "encoding": "7bit",
                }
            }
        })
    );
}

#[tokio::test]
async fn test_multiple_uploads() {
    let handler = common::handler(HandlerConfig::default());
    let body = common::multipart_body(
        &json!({
            "query": "mutation($files: [Upload!]!) { multipleUpload(files: $files) { filename mimetype } }",
            "variables": { "files": [null, null] },
        }),
        &json!({ "0": ["variables.files.0"], "1": ["variables.files.1"] }),
        &[
            notes(),
            FilePart {
                filename: "data.json",
                content_type: "application/json",
                contents: "{}",
            },
        ],
    );

    let response = common::send(&handler, common::post_multipart("/", body)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["data"]["multipleUpload"],
        json!([
            { "filename": "notes.txt", "mimetype": "text/plain" },
            { "filename": "data.json", "mimetype": "application/json" },
        ])
    );
}

#[tokio::test]
async fn test_upload_contents_readable_in_resolver() {
    let handler = common::handler(HandlerConfig::default());
    let body = common::multipart_body(
        &json!({
            "query": "mutation($file: Upload!) { uploadContents(file: $file) }",
            "variables": { "file": null },
        }),
        &json!({ "0": ["variables.file"] }),
        &[notes()],
    );

    let response = common::send(&handler, common::post_multipart("/", body)).await;
    assert_eq!(response.json()["data"]["uploadContents"], "remember the milk");
}

#[tokio::test]
async fn test_malformed_multipart_goes_through_format_error() {
    let server = common::server().format_error(|mut error| {
        error.message = format!("upload rejected: {}", error.message);
        error
    });
    let handler = GraphQLHandler::builder(server).build();

    let body = common::multipart_body(&json!({ "query": "{ testString }" }), &json!("not a map"), &[]);
    let response = common::send(&handler, common::post_multipart("/", body)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.header("content-type"), Some("application/json"));
    let message = response.json()["errors"][0]["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("upload rejected: "));
}

#[tokio::test]
async fn test_oversized_file_is_413() {
    let handler = common::handler(HandlerConfig {
        uploads: UploadConfig {
            max_file_size: Some(4),
            ..UploadConfig::default()
        },
        ..HandlerConfig::default()
    });
    let body = common::multipart_body(
        &json!({
            "query": "mutation($file: Upload!) { singleUpload(file: $file) { filename } }",
            "variables": { "file": null },
        }),
        &json!({ "0": ["variables.file"] }),
        &[notes()],
    );

    let response = common::send(&handler, common::post_multipart("/", body)).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.json()["errors"].is_array());
}

#[tokio::test]
async fn test_uploads_disabled_rejects_multipart_as_invalid_json() {
    let handler = common::handler(HandlerConfig {
        uploads: UploadConfig {
            enabled: false,
            ..UploadConfig::default()
        },
        ..HandlerConfig::default()
    });
    let body = common::multipart_body(
        &json!({ "query": "{ testString }" }),
        &json!({}),
        &[],
    );

    let response = common::send(&handler, common::post_multipart("/", body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "POST body sent invalid JSON.");
}

#[tokio::test]
async fn test_declared_transfer_encoding_is_not_reported() {
    let handler = common::handler(HandlerConfig::default());
    let b = common::MULTIPART_BOUNDARY;
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"operations\"\r\n\r\n\
         {{\"query\":\"mutation($file: Upload!) {{ singleUpload(file: $file) {{ filename encoding }} }}\",\"variables\":{{\"file\":null}}}}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"map\"\r\n\r\n{{\"0\":[\"variables.file\"]}}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"0\"; filename=\"a.txt\"\r\n\
         Content-Type: text/plain\r\nContent-Transfer-Encoding: 8bit\r\n\r\nabc\r\n--{b}--\r\n"
    );

    let response = common::send(&handler, common::post_multipart("/", body)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["data"]["singleUpload"],
        json!({ "filename": "a.txt", "encoding": "7bit" })
    );
}
