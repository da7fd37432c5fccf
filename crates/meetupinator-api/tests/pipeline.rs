//! Request pipeline behavior against a local mock server.

use meetupinator_api::{ApiErrorCode, ClientConfig, Credential, GroupId, MeetupClient};
use mockito::{Matcher, Server, ServerGuard};

const KEY: &str = "test-key";

fn client_for(server: &ServerGuard) -> MeetupClient {
    let credential = Credential::resolve(Some(KEY), None).unwrap();
    let config = ClientConfig::new(credential)
        .with_base_url(server.url())
        .unwrap();
    MeetupClient::new(config).unwrap()
}

#[tokio::test]
async fn resolve_group_id_returns_first_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), KEY.into()),
            Matcher::UrlEncoded("group_urlname".into(), "rust-nyc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results": [{"id": "123", "name": "Rust NYC"}, {"id": "456"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let id = client_for(&server).resolve_group_id("rust-nyc").await.unwrap();

    assert_eq!(id, GroupId::new("123"));
    mock.assert_async().await;
}

#[tokio::test]
async fn resolve_group_id_accepts_numeric_ids() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": [{"id": 18441829}], "meta": {"count": 1}}"#)
        .create_async()
        .await;

    let id = client_for(&server).resolve_group_id("rust-nyc").await.unwrap();
    assert_eq!(id.as_str(), "18441829");
}

#[tokio::test]
async fn resolve_group_id_with_no_results_is_lookup_failure() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server)
        .resolve_group_id("no-such-group")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ApiErrorCode::Lookup);
    assert!(err.message().contains("no-such-group"));
    mock.assert_async().await;
}

#[tokio::test]
async fn fetch_upcoming_events_builds_query_and_keeps_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/events")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), KEY.into()),
            Matcher::UrlEncoded("sign".into(), "true".into()),
            Matcher::UrlEncoded("photo-host".into(), "public".into()),
            Matcher::UrlEncoded("status".into(), "upcoming".into()),
            Matcher::UrlEncoded("group_id".into(), "g1,g2".into()),
            Matcher::UrlEncoded("time".into(), ",2w".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"results": [{"id": "e1", "name": "First"}, {"id": "e2", "name": "Second"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let ids = [GroupId::new("g1"), GroupId::new("g2")];
    let events = client_for(&server)
        .fetch_upcoming_events(&ids, Some(2))
        .await
        .unwrap();

    let names: Vec<_> = events.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn fetch_upcoming_events_empty_results_is_ok() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/events")
        .match_query(Matcher::UrlEncoded("group_id".into(), "g1".into()))
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .expect(1)
        .create_async()
        .await;

    let events = client_for(&server)
        .fetch_upcoming_events(&[GroupId::new("g1")], None)
        .await
        .unwrap();

    assert!(events.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn status_failures_then_success_retries() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("temporarily broken")
        .expect(2)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": [{"id": 7}]}"#)
        .expect(1)
        .create_async()
        .await;

    let id = client_for(&server).resolve_group_id("rust-nyc").await.unwrap();

    assert_eq!(id.as_str(), "7");
    failing.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn parse_failures_use_the_whole_budget_before_success() {
    let mut server = Server::new_async().await;
    let garbage = server
        .mock("GET", "/2/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .expect(3)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/2/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": [{"id": "e1"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let events = client_for(&server)
        .fetch_upcoming_events(&[GroupId::new("1")], None)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    garbage.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn exhausted_budget_surfaces_final_error() {
    let mut server = Server::new_async().await;
    let early = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("early failure")
        .expect(3)
        .create_async()
        .await;
    let last = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("final failure")
        .expect(1)
        .create_async()
        .await;

    let err = client_for(&server)
        .resolve_group_id("rust-nyc")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ApiErrorCode::UpstreamStatus);
    assert_eq!(err.status(), Some(503));
    assert!(err.message().contains("final failure"));
    assert!(!err.message().contains("early failure"));
    early.assert_async().await;
    last.assert_async().await;
}

#[tokio::test]
async fn not_found_error_carries_status_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"problem": "group not found"}"#)
        .expect(4)
        .create_async()
        .await;

    let err = client_for(&server)
        .resolve_group_id("rust-nyc")
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("404 - Not Found"));
    assert!(text.contains("Response Body:\n{\"problem\": \"group not found\"}"));
    assert!(text.contains("/2/groups"));
    assert!(!text.contains(KEY));
    mock.assert_async().await;
}

#[tokio::test]
async fn parse_error_includes_target_and_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json at all")
        .expect(4)
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_upcoming_events(&[GroupId::new("1")], Some(1))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ApiErrorCode::ResponseParse);
    assert!(err.message().starts_with("unable to parse the response for call to "));
    assert!(err.message().contains("/2/events"));
    assert!(err.message().ends_with("\nResponse Body:\nnot json at all"));
    assert!(!err.message().contains(KEY));
    mock.assert_async().await;
}

#[tokio::test]
async fn no_content_parse_error_has_no_body_section() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/2/events")
        .match_query(Matcher::Any)
        .with_status(204)
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_upcoming_events(&[GroupId::new("1")], None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), ApiErrorCode::ResponseParse);
    assert!(!err.message().contains("Response Body"));
}

#[tokio::test]
async fn retry_budget_is_configurable() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let credential = Credential::resolve(Some(KEY), None).unwrap();
    let config = ClientConfig::new(credential)
        .with_base_url(server.url())
        .unwrap()
        .with_max_retries(0);
    let client = MeetupClient::new(config).unwrap();

    let err = client.resolve_group_id("rust-nyc").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    mock.assert_async().await;
}

#[tokio::test]
async fn connection_refused_is_transport_failure() {
    let credential = Credential::resolve(Some(KEY), None).unwrap();
    let config = ClientConfig::new(credential)
        .with_base_url("http://127.0.0.1:1")
        .unwrap();
    let client = MeetupClient::new(config).unwrap();

    let err = client.resolve_group_id("rust-nyc").await.unwrap_err();

    assert_eq!(err.code(), ApiErrorCode::Transport);
    assert!(err.message().contains("/2/groups"));
    assert!(!err.to_string().contains(KEY));
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/proxy/2/groups")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": [{"id": 5}]}"#)
        .expect(1)
        .create_async()
        .await;

    let credential = Credential::resolve(Some(KEY), None).unwrap();
    let config = ClientConfig::new(credential)
        .with_base_url(format!("{}/proxy", server.url()))
        .unwrap();
    let client = MeetupClient::new(config).unwrap();

    let id = client.resolve_group_id("rust-nyc").await.unwrap();
    assert_eq!(id.as_str(), "5");
    mock.assert_async().await;
}

#[tokio::test]
async fn group_name_is_sent_as_given() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/2/groups")
        .match_query(Matcher::UrlEncoded("group_urlname".into(), " rust-nyc ".into()))
        .with_status(200)
        .with_body(r#"{"results": [{"id": 9}]}"#)
        .expect(1)
        .create_async()
        .await;

    let id = client_for(&server).resolve_group_id(" rust-nyc ").await.unwrap();
    assert_eq!(id.as_str(), "9");
    mock.assert_async().await;
}

mod raw_server {
    //! A bare TCP server scripted per connection, for failures a mock HTTP
    //! server cannot produce.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// What to do with one accepted connection.
    pub enum Reply {
        /// Close without answering.
        Drop,
        /// Read the request, write these bytes, close.
        Raw(String),
    }

    pub fn http(status: &str, body: &str) -> Reply {
        Reply::Raw(format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        ))
    }

    /// Serves `script` one connection at a time, then stops listening.
    ///
    /// Returns the base URL and a counter of accepted connections.
    pub async fn start(script: Vec<Reply>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            for reply in script {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                match reply {
                    Reply::Drop => drop(socket),
                    Reply::Raw(response) => {
                        read_request(&mut socket).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                }
            }
        });

        (base_url, accepted)
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
    }
}

fn client_at(base_url: &str, max_retries: u32) -> MeetupClient {
    let credential = Credential::resolve(Some(KEY), None).unwrap();
    let config = ClientConfig::new(credential)
        .with_base_url(base_url)
        .unwrap()
        .with_max_retries(max_retries);
    MeetupClient::new(config).unwrap()
}

#[tokio::test]
async fn dropped_connections_then_success_retries() {
    use raw_server::{Reply, http};
    use std::sync::atomic::Ordering;

    for dropped in 1..=3 {
        let mut script: Vec<Reply> = (0..dropped).map(|_| Reply::Drop).collect();
        script.push(http("200 OK", r#"{"results": [{"id": 1}]}"#));
        let (base_url, accepted) = raw_server::start(script).await;

        let id = client_at(&base_url, 3)
            .resolve_group_id("rust-nyc")
            .await
            .unwrap();

        assert_eq!(id.as_str(), "1");
        assert_eq!(accepted.load(Ordering::SeqCst), dropped + 1);
    }
}

#[tokio::test]
async fn dropped_connections_exhaust_budget_as_transport_failure() {
    use raw_server::Reply;
    use std::sync::atomic::Ordering;

    let script = (0..4).map(|_| Reply::Drop).collect();
    let (base_url, accepted) = raw_server::start(script).await;

    let err = client_at(&base_url, 3)
        .resolve_group_id("rust-nyc")
        .await
        .unwrap_err();

    assert_eq!(err.code(), ApiErrorCode::Transport);
    assert_eq!(accepted.load(Ordering::SeqCst), 4);
    assert!(!err.to_string().contains(KEY));
}

#[tokio::test]
async fn transport_and_status_failures_share_one_budget() {
    use raw_server::{Reply, http};
    use std::sync::atomic::Ordering;

    let script = vec![
        Reply::Drop,
        http("500 Internal Server Error", "boom"),
        http("200 OK", r#"{"results": [{"id": 2}]}"#),
    ];
    let (base_url, accepted) = raw_server::start(script).await;

    let id = client_at(&base_url, 2)
        .resolve_group_id("rust-nyc")
        .await
        .unwrap();
    assert_eq!(id.as_str(), "2");
    assert_eq!(accepted.load(Ordering::SeqCst), 3);

    // Same mix with one retry fewer ends on the status failure.
    let script = vec![
        Reply::Drop,
        http("500 Internal Server Error", "boom"),
        http("200 OK", r#"{"results": [{"id": 2}]}"#),
    ];
    let (base_url, accepted) = raw_server::start(script).await;

    let err = client_at(&base_url, 1)
        .resolve_group_id("rust-nyc")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreadable_status_body_is_reported() {
    use raw_server::Reply;

    let truncated = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial"
        .to_string();
    let (base_url, _accepted) = raw_server::start(vec![Reply::Raw(truncated)]).await;

    let err = client_at(&base_url, 0)
        .resolve_group_id("rust-nyc")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.message().contains("Response Body:\n<body unavailable: "));
}
