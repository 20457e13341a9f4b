use std::time::Duration;

use serde::{Deserialize, Serialize};
use tower_jsonc::prelude::*;
use tracing_subscriber::EnvFilter;

// Any endpoint that echoes JSON bodies works here
const ECHO_URL: &str = "https://httpbin.org/post";

#[derive(Debug, Serialize, Deserialize, Default)]
struct Params {
    name: String,
    age: u32,
    scores: Vec<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct EchoResponse {
    #[serde(default)]
    json: Option<Params>,
    #[serde(default)]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let params = Params {
        name: "Jane Doe".to_string(),
        age: 25,
        scores: vec![100, 90, 80],
    };

    let ctx = RequestContext::new().with_timeout(Duration::from_secs(10));

    println!("Posting {params:?} to {ECHO_URL}");
    let echo = Request::<EchoResponse>::new()
        .post_json(&ctx, ECHO_URL, &params)
        .await?;

    match echo.json {
        Some(Params { name, age, scores }) => {
            println!("✓ Echoed by {}", echo.url);
            println!("  name:   {name}");
            println!("  age:    {age}");
            println!("  scores: {scores:?}");
        }
        None => println!("✗ Server did not answer with JSON"),
    }

    // The same request against an endpoint that answers with HTML decodes to the default value
    let page = Request::<EchoResponse>::new()
        .fetch(&ctx, Method::GET, "https://httpbin.org/html", None)
        .await?;
    println!("\nGET /html -> {page:?}");

    Ok(())
}
