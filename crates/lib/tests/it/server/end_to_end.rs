use chrono::Duration;
use userd::{
    Clock, Error, Subject,
    protocol::{Command, Response, ResponseCode},
    server::{Client, Server, ServerConfig, ServerError},
};

use super::helpers::{TestServer, write_certificate};
use crate::helpers::{PASSWORD, add_user, setup};

#[tokio::test(flavor = "multi_thread")]
async fn test_authorization_over_tls() {
    let ctx = setup();
    let (admin, _) = add_user(&ctx.directory, "a@x.com", "admin");
    ctx.directory
        .create_grant(
            "/r",
            Subject::RoleWide,
            &admin.role_id,
            ctx.clock.now() + Duration::hours(1),
        )
        .unwrap();

    let server = TestServer::start(ctx.directory.clone()).await;
    let command = Command::is_authorized("a@x.com", PASSWORD, "/r");

    let response = server.client.send(&command).await.unwrap();
    assert_eq!(response, Response::success());

    ctx.clock.advance(Duration::hours(2));
    let response = server.client.send(&command).await.unwrap();
    assert_eq!(response.code, ResponseCode::SystemError);
    assert_eq!(response.message, "Permission for resource /r has expired");

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failures_are_system_errors() {
    let ctx = setup();
    add_user(&ctx.directory, "a@x.com", "admin");
    let server = TestServer::start(ctx.directory.clone()).await;

    let response = server
        .client
        .send(&Command::is_authorized("a@x.com", "wrong", "/r"))
        .await
        .unwrap();
    assert_eq!(response, Response::system_error("Password does not match"));

    let response = server
        .client
        .send(&Command::is_authorized("a@x.com", PASSWORD, "/r"))
        .await
        .unwrap();
    assert_eq!(
        response,
        Response::system_error("No permission found for resource /r")
    );

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unsupported_and_malformed_requests() {
    let ctx = setup();
    let server = TestServer::start(ctx.directory.clone()).await;

    let command = Command {
        op: "create_user".to_string(),
        ..Command::is_authorized("a@x.com", PASSWORD, "/r")
    };
    let response = server.client.send(&command).await.unwrap();
    assert_eq!(response, Response::system_error("command not supported"));

    let response = server.client.send_raw(b"{not json").await.unwrap();
    assert_eq!(response, Response::system_error("command not supported"));

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_clients() {
    let ctx = setup();
    let (admin, _) = add_user(&ctx.directory, "a@x.com", "admin");
    ctx.directory
        .create_grant(
            "/r",
            Subject::RoleWide,
            &admin.role_id,
            ctx.clock.now() + Duration::hours(1),
        )
        .unwrap();
    let server = TestServer::start(ctx.directory.clone()).await;

    let requests: Vec<_> = (0..8)
        .map(|_| {
            let client = server.client.clone();
            tokio::spawn(async move {
                client
                    .send(&Command::is_authorized("a@x.com", PASSWORD, "/r"))
                    .await
            })
        })
        .collect();
    for request in requests {
        assert!(request.await.unwrap().unwrap().is_success());
    }

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_silent_connection_is_dropped() {
    let ctx = setup();
    let server =
        TestServer::start_with_timeout(ctx.directory.clone(), std::time::Duration::from_millis(200))
            .await;

    // Connect without ever starting the TLS handshake.
    let mut stream = tokio::net::TcpStream::connect(&server.addr).await.unwrap();
    let mut buf = [0u8; 16];
    let closed = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        tokio::io::AsyncReadExt::read(&mut stream, &mut buf),
    )
    .await
    .expect("server kept an idle connection open");
    assert!(matches!(closed, Ok(0) | Err(_)));

    // The server keeps serving after dropping the idle peer.
    let response = server
        .client
        .send(&Command::is_authorized("nobody@x.com", PASSWORD, "/r"))
        .await
        .unwrap();
    assert_eq!(response.code, ResponseCode::SystemError);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_bind_requires_certificate() {
    let ctx = setup();
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::new(ctx.dir.path())
    };
    let err = Server::bind(&config, ctx.directory.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Server(ServerError::Tls { .. })));
}

#[tokio::test]
async fn test_client_rejects_untrusted_server() {
    let ctx = setup();
    let server = TestServer::start(ctx.directory.clone()).await;

    // A different self-signed certificate is not a trust anchor for the server.
    let other = tempfile::tempdir().unwrap();
    let other_cert = write_certificate(other.path());
    let client = Client::new(server.addr.clone(), "localhost", &other_cert).unwrap();

    let err = client
        .send(&Command::is_authorized("a@x.com", PASSWORD, "/r"))
        .await
        .unwrap_err();
    assert!(err.is_io_error());

    server.stop().await.unwrap();
}

#[test]
fn test_invalid_server_name() {
    let dir = tempfile::tempdir().unwrap();
    let cert = write_certificate(dir.path());
    let err = Client::new("127.0.0.1:9669", "not a hostname!", &cert).unwrap_err();
    assert!(matches!(
        err,
        Error::Server(ServerError::InvalidServerName { .. })
    ));
}
