//! Test helpers for the HTTP client integration tests

use std::fs;
use std::path::PathBuf;

use room_api::{ClientConfig, HttpRoomClient};

/// Load a JSON body from the fixtures directory
pub fn fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}

/// A client pointed at a mock server
pub fn client_for(server: &mockito::Server) -> HttpRoomClient {
    HttpRoomClient::new(ClientConfig::new().with_base_url(server.url()))
        .expect("client should build against mock server URL")
}

/// A client that sends a fixed session cookie
pub fn client_with_cookie(server: &mockito::Server, cookie: &str) -> HttpRoomClient {
    HttpRoomClient::new(
        ClientConfig::new()
            .with_base_url(server.url())
            .with_session_cookie(cookie),
    )
    .expect("client should build against mock server URL")
}
