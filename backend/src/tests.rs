//! Tests for the backend application bootstrap, covering session keys,
//! readiness signalling and the assembled HTTP surface.

use super::load_session_key;
use super::server::{ServerConfig, create_server};
use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use photos_backend::inbound::http::health::HealthState;
use rstest::{fixture, rstest};
use std::io::Write;

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn server_config() -> ServerConfig {
    ServerConfig::new(
        Key::generate(),
        false,
        SameSite::Lax,
        ([127, 0, 0, 1], 0).into(),
    )
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(
    health_state: web::Data<HealthState>,
    server_config: ServerConfig,
) {
    assert!(!health_state.is_ready(), "state should start unready");
    assert_eq!(server_config.bind_addr().port(), 0);

    let _server =
        create_server(health_state.clone(), server_config).expect("server should build");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}

#[rstest]
fn session_key_is_derived_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&[7u8; 64]).expect("write key material");

    let first = load_session_key(file.path(), false).expect("key loads");
    let second = load_session_key(file.path(), false).expect("key loads again");
    assert_eq!(first.master(), second.master());
}

#[rstest]
fn missing_session_key_is_replaced_when_ephemeral_allowed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let key = load_session_key(&dir.path().join("absent"), true);
    assert!(key.is_ok());
}
