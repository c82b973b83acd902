//! End-to-end tests: the client talking to the in-crate echo server over
//! real sockets.

use srcon::client::Client;
use srcon::error::RconError;
use srcon::packet::PacketType;
use srcon::server::Server;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

const PASSWORD: &str = "hello";

/// Spin up a server on an ephemeral port and return its address.
async fn start_server() -> String {
    let server = Server::bind("127.0.0.1:0", PASSWORD).await.unwrap();
    let addr = server.local_addr().unwrap();
    server.start();
    addr.to_string()
}

#[tokio::test]
async fn echo_command_round_trips() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let response = client.exec("echo hello world", 200).await.unwrap();
    assert_eq!(response.id(), 200);
    assert_eq!(response.packet_type(), PacketType::Response);
    assert_eq!(response.body(), "hello world");
}

#[tokio::test]
async fn empty_command_yields_empty_body() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let response = client.exec("", 201).await.unwrap();
    assert_eq!(response.body(), "");
}

#[tokio::test]
async fn special_characters_survive_the_wire() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let payload = "!@#$%^&*()_+-=[]{}|;':\",./<>?";
    let response = client
        .exec(&format!("echo {}", payload), 202)
        .await
        .unwrap();
    assert_eq!(response.body(), payload);
}

#[tokio::test]
async fn unicode_bodies_survive_the_wire() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let payload = "Hello 世界 🌍";
    let response = client
        .exec(&format!("echo {}", payload), 203)
        .await
        .unwrap();
    assert_eq!(response.body(), payload);
}

#[tokio::test]
async fn long_commands_are_not_truncated() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let payload = "A".repeat(500);
    let response = client
        .exec(&format!("echo {}", payload), 204)
        .await
        .unwrap();
    assert_eq!(response.body(), payload);
}

#[tokio::test]
async fn sequential_commands_on_one_connection() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    for i in 0..5 {
        let response = client.command(&format!("echo test{}", i)).await.unwrap();
        assert_eq!(response.body(), format!("test{}", i));
    }
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let addr = start_server().await;

    let result = Client::connect(&addr, "not the password").await;
    assert!(matches!(result, Err(RconError::AuthenticationError)));
}

#[tokio::test]
async fn concurrent_connections_do_not_interfere() {
    let addr = start_server().await;

    let mut tasks = Vec::new();
    for i in 0..3 {
        let addr = addr.clone();
        tasks.push(tokio::spawn(async move {
            let mut client = Client::connect(&addr, PASSWORD).await.unwrap();
            let response = client
                .exec(&format!("echo concurrent{}", i), 500 + i)
                .await
                .unwrap();
            response.body() == format!("concurrent{}", i)
        }));
    }

    for task in tasks {
        assert!(task.await.unwrap());
    }
}

#[tokio::test]
async fn reconnecting_after_close_works() {
    let addr = start_server().await;

    let mut first = Client::connect(&addr, PASSWORD).await.unwrap();
    let response = first.exec("echo first", 600).await.unwrap();
    assert_eq!(response.body(), "first");
    drop(first);

    let mut second = Client::connect(&addr, PASSWORD).await.unwrap();
    let response = second.exec("echo second", 601).await.unwrap();
    assert_eq!(response.body(), "second");
}

#[tokio::test]
async fn version_and_help_answer_something() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let version = client.command("version").await.unwrap();
    assert!(version.body().starts_with("srcon"));

    let help = client.command("help").await.unwrap();
    assert!(help.body().contains("echo"));
}

#[tokio::test]
async fn unknown_commands_get_an_error_body() {
    let addr = start_server().await;
    let mut client = Client::connect(&addr, PASSWORD).await.unwrap();

    let response = client.command("nonexistentcommand12345").await.unwrap();
    assert_eq!(response.body(), "Unknown command: nonexistentcommand12345");
}

#[tokio::test]
async fn silent_server_times_out_the_read() {
    // a listener that accepts and then never says anything
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        // hold the socket open without responding
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let result = Client::connect_with_timeout(&addr, PASSWORD, Duration::from_millis(200)).await;
    assert!(matches!(result, Err(RconError::TimeoutError(_))));
}

#[tokio::test]
async fn garbage_size_prefix_fails_decode() {
    // a listener that answers the auth attempt with a bogus size prefix
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(&1_000_000i32.to_le_bytes()).await.unwrap();
    });

    let result = Client::connect(&addr, PASSWORD).await;
    assert!(matches!(result, Err(RconError::InvalidPacketSize(1_000_000))));
}

#[tokio::test]
async fn refused_connection_reports_unreachable_host() {
    // bind a port, then close it so nothing is listening there
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = Client::connect(&addr, PASSWORD).await;
    assert!(matches!(result, Err(RconError::UnreachableHost(_))));
}
