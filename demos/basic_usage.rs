use requesty::{Client, RequestOption};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("=== One-off GET with query params ===");

    let response = requesty::get(
        "https://httpbin.org/get",
        vec![
            RequestOption::params([("lang", "rust"), ("page", "1")]),
            RequestOption::header("Accept", "application/json"),
        ],
    )
    .await?;
    println!("Status: {}", response.status());
    println!("Final URL: {}", response.url());

    let body = response.text();
    println!("First 200 chars: {}", &body[..body.len().min(200)]);

    // A client keeps defaults across calls
    let client = Client::new();

    println!("\n=== POST with JSON ===");

    let response = client
        .request(
            "post",
            "https://httpbin.org/post",
            vec![RequestOption::json(&serde_json::json!({
                "name": "requesty",
                "language": "rust"
            }))?],
        )
        .await?;
    let echoed: serde_json::Value = response.json()?;
    println!("Server saw: {}", echoed["json"]);

    println!("\n=== POST with a form, fluently ===");

    let response = client
        .post("https://httpbin.org/post")
        .form("field1", "value1")
        .form("field2", "value2")
        .cookie("session", "abc")
        .send()
        .await?;
    println!("Status: {}", response.status());

    println!("\n=== Error Handling Example ===");

    let response = client.get("https://httpbin.org/status/404").send().await?;
    match response.error_for_status() {
        Ok(response) => println!("Unexpected success: {}", response.status()),
        Err(e) => println!("Expected error for 404: {}", e),
    }

    match client.request("trace", "https://httpbin.org/get", Vec::new()).await {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("Expected error for TRACE: {}", e),
    }

    println!("\n=== All examples completed successfully! ===");

    Ok(())
}
