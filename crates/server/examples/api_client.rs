//! Walk through the jokepool API against a running server.
//!
//! ```text
//! cargo run -p jokepool-server --example api_client
//! ```

use reqwest::Client;

const SERVER_URL: &str = "http://localhost:8080";

async fn show(label: &str, resp: reqwest::Response) -> anyhow::Result<()> {
    println!("{label}:");
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    show("1. Health Check", resp).await?;

    let resp = client.post(format!("{SERVER_URL}/api/v1/joke")).send().await?;
    show("2. Prime The Pool", resp).await?;

    let resp = client.get(format!("{SERVER_URL}/api/v1/pool")).send().await?;
    show("3. Pool Status", resp).await?;

    for n in 1..=3 {
        let resp = client.get(format!("{SERVER_URL}/api/v1/joke")).send().await?;
        show(&format!("4.{n} Serve A Joke"), resp).await?;
    }

    let resp = client.get(format!("{SERVER_URL}/metrics")).send().await?;
    show("5. Prometheus Metrics", resp).await?;

    println!("All examples completed!");
    Ok(())
}
