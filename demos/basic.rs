use clippymap_fetch::{get_retry_delay, is_rate_limit_error, RateLimitedFetchClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/status/429".to_owned());

    let client = RateLimitedFetchClient::from_env()?;
    println!("retry config: {}", serde_json::to_string(client.config())?);

    let toast = |message: &str| eprintln!("[toast] {message}");
    let response = client
        .fetch_with_notifier(&url, &Default::default(), &toast)
        .await?;

    if is_rate_limit_error(&response) {
        println!(
            "still rate limited, server asks for {} s",
            get_retry_delay(&response)
        );
    } else {
        println!("{} {}", response.status(), response.text().await?);
    }

    Ok(())
}
