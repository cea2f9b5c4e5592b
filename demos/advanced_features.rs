use requesty::{Client, CustomHook, FilePart, LoggingHook, RequestOption};
use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("=== Advanced requesty Features Demo ===\n");

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .max_redirects(5)
        .hook(LoggingHook::new())
        .hook(CustomHook::new(
            |request| println!("🔄 Making request: {} {}", request.method(), request.url()),
            |_, outcome| match outcome {
                Ok(response) => println!("✅ Received response: {}", response.status()),
                Err(e) => println!("❌ Request failed: {}", e),
            },
            "Printer",
        ))
        .build()?;

    println!("=== Timeout Handling ===");

    // The per-call deadline overrides the client default
    match client
        .get("https://httpbin.org/delay/3")
        .timeout(Duration::from_secs(1))
        .send()
        .await
    {
        Ok(_) => println!("Unexpected: Request completed"),
        Err(e) if e.is_timeout() => println!("Expected timeout error: {}", e),
        Err(e) => println!("Other error: {}", e),
    }

    println!("\n=== Multipart Upload ===");

    let response = client
        .request(
            "POST",
            "https://httpbin.org/post",
            vec![
                RequestOption::form([("description", "greeting")]),
                RequestOption::File(FilePart::with_content("file", "hi.text", "hi!").mime("text/plain")),
            ],
        )
        .await?;
    println!("Multipart upload status: {}", response.status());

    println!("\n=== Gzip Body ===");

    let response = client
        .post("https://httpbin.org/post")
        .json(&serde_json::json!({"compressed": true}))?
        .gzip()
        .send()
        .await?;
    println!("Gzip upload status: {}", response.status());

    println!("\n=== Authentication Example ===");

    let response = client
        .get("https://httpbin.org/basic-auth/user/passwd")
        .basic_auth("user", Some("passwd"))
        .send()
        .await?;
    println!("Auth status: {}", response.status());

    println!("\n=== Re-decoding a Body ===");

    let mut response = client.get("https://httpbin.org/encoding/utf8").send().await?;
    println!("Decoded as {}: {} chars", response.encoding(), response.text().chars().count());
    response.set_encoding("latin1")?;
    println!("Decoded as {}: {} chars", response.encoding(), response.text().chars().count());

    println!("\n=== All advanced examples completed! ===");

    Ok(())
}
