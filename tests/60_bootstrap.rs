mod common;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

/// Poll until the listener answers anything at all
async fn wait_ready(client: &reqwest::Client, base_url: &str, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() > deadline {
            break;
        }
        if client.get(format!("{}/favicon.ico", base_url)).send().await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", base_url, timeout)
}

#[tokio::test]
async fn server_starts_and_serves_without_a_database() -> Result<()> {
    let public = common::public_dir()?;
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let port_text = port.to_string();

    // Port 1 on loopback refuses connections, so the single connection attempt fails
    let config = common::config_with(
        public.path(),
        &[
            ("PORT", port_text.as_str()),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "1"),
        ],
    );

    let server = tokio::spawn(sportsbuddies::app::serve(config));

    let client = reqwest::Client::new();
    let base_url = format!("http://127.0.0.1:{}", port);
    wait_ready(&client, &base_url, Duration::from_secs(10)).await?;

    // Static assets need no store
    let res = client
        .get(format!("{}/stylesheets/style.css", base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "body { margin: 0 }");

    // Health reports the outage instead of the process dying
    let res = client.get(format!("{}/health", base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        res.headers().get(reqwest::header::SET_COOKIE).is_none(),
        "health must not open a session"
    );

    // Store-backed pages fail per request with a server error
    let res = client.get(format!("{}/", base_url)).send().await?;
    assert!(res.status().is_server_error(), "unexpected status: {}", res.status());

    assert!(!server.is_finished(), "server exited while the database was down");
    server.abort();
    Ok(())
}

#[tokio::test]
async fn malformed_database_url_is_fatal() -> Result<()> {
    let public = common::public_dir()?;
    let config = common::config_with(public.path(), &[("DATABASE_URL", "not a url")]);

    let err = sportsbuddies::app::serve(config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid database URL"));
    Ok(())
}
