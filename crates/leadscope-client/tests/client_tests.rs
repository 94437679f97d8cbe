// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use leadscope_app::{
    Gateway, GatewayError, LeadId, Platform, Popularity, SearchParams, SearchPlatform,
    normalize_lead,
};
use leadscope_client::Client;
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

fn json_response(body: &str, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());
    Ok((server, addr))
}

#[test]
fn unreachable_server_is_a_transport_error() -> Result<()> {
    let client = Client::new("http://127.0.0.1:1", Some(Duration::from_millis(50)))?;
    let error = client
        .fetch_history()
        .expect_err("history should fail for unreachable endpoint");
    match error {
        GatewayError::Transport(message) => assert!(message.contains("server.base_url")),
        other => panic!("expected transport error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn search_posts_params_and_normalizes_results() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/scrape");
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("request body should read");
        let body: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(
            body,
            serde_json::json!({
                "keyword": "AI founders",
                "location": "Berlin",
                "platform": "linkedin",
                "max_results": 20,
            })
        );
        let response = json_response(
            r#"{"status":"success","results":[
                {"id":"li_1","name":"Jane","platform":"LinkedIn","followers":1500},
                {"name":"Group","platform":"Telegram","description":"d","members":"40"}
            ]}"#,
            200,
        );
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Some(Duration::from_secs(1)))?;
    let params = SearchParams::new("AI founders", "Berlin", SearchPlatform::LinkedIn, 20);
    let leads = client.submit_search(&params)?;

    assert_eq!(leads.len(), 2);
    assert_eq!(leads[0].popularity, Some(Popularity::Followers(1_500)));
    assert_eq!(leads[1].platform, Platform::Other("Telegram".to_owned()));
    assert_eq!(leads[1].bio.as_deref(), Some("d"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn search_error_envelope_surfaces_detail() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        for body in [
            r#"{"status":"error","detail":"rate limited"}"#,
            r#"{"status":"error"}"#,
        ] {
            let request = server.recv().expect("request expected");
            request
                .respond(json_response(body, 200))
                .expect("response should succeed");
        }
    });

    let client = Client::new(&addr, None)?;
    let params = SearchParams::new("rust", "", SearchPlatform::X, 5);
    assert_eq!(
        client.submit_search(&params),
        Err(GatewayError::Application("rate limited".to_owned()))
    );
    assert_eq!(
        client.submit_search(&params),
        Err(GatewayError::Application("Unknown error".to_owned()))
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn http_failure_without_envelope_uses_detail() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"detail":"Not Found"}"#, 404))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, None)?;
    assert_eq!(
        client.fetch_saved_leads(),
        Err(GatewayError::Application("Not Found".to_owned()))
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_json_success_body_is_a_transport_error() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(Response::from_string("<html>proxy</html>").with_status_code(200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, None)?;
    assert!(matches!(
        client.fetch_history(),
        Err(GatewayError::Transport(_))
    ));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn list_endpoints_tolerate_missing_keys() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let expected = ["/history", "/leads", "/api/config/audience"];
        for path in expected {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), path);
            request
                .respond(json_response("{}", 200))
                .expect("response should succeed");
        }
    });

    let client = Client::new(&addr, None)?;
    assert!(client.fetch_history()?.is_empty());
    assert!(client.fetch_saved_leads()?.is_empty());
    assert_eq!(client.fetch_audience_config()?, None);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn history_reads_nested_params() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let body = r#"{"history":[{"id":"h1","timestamp":"2025-02-01T12:00:00",
            "params":{"keyword":"Web3","city":"Austin","state":"TX","max_results":30},
            "result_count":4}]}"#;
        request
            .respond(json_response(body, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, None)?;
    let history = client.fetch_history()?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].keyword, "Web3");
    assert_eq!(history[0].location, "Austin, TX");
    assert_eq!(history[0].replay_params().max_results, 30);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn save_posts_the_full_lead() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Post);
        assert_eq!(request.url(), "/leads");
        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("request body should read");
        let body: serde_json::Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(body["id"], "x_9");
        assert_eq!(body["likes"], 12);
        request
            .respond(json_response(r#"{"status":"success"}"#, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, None)?;
    let lead = normalize_lead(&serde_json::json!({
        "id": "x_9",
        "name": "Sam",
        "platform": "X",
        "likes": 12,
    }));
    client.save_lead(&lead)?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn delete_encodes_the_id_as_one_path_segment() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Delete);
        assert_eq!(request.url(), "/leads/li%2F42%20x");
        request
            .respond(json_response(r#"{"status":"success"}"#, 200))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, None)?;
    client.delete_lead(&LeadId::new("li/42 x"))?;

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn export_returns_raw_bytes_and_rejects_failures() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/download-csv");
        request
            .respond(Response::from_string("id,name\nli_1,Jane\n").with_status_code(200))
            .expect("response should succeed");

        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"detail":"No leads"}"#, 404))
            .expect("response should succeed");
    });

    let client = Client::new(&addr, None)?;
    assert_eq!(client.export_csv()?, b"id,name\nli_1,Jane\n".to_vec());
    assert_eq!(
        client.export_csv(),
        Err(GatewayError::Application("No leads".to_owned()))
    );

    handle.join().expect("server thread should join");
    Ok(())
}
