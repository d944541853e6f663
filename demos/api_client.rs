/// Example HTTP client demonstrating how to call the zipcloud-rs HTTP server API
///
/// Run the server first:
/// ```bash
/// cargo run --bin server
/// ```
///
/// Then run this example:
/// ```bash
/// cargo run --example api_client
/// ```

use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct LookupRequest {
    postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LookupResponse {
    success: bool,
    data: AddressData,
}

#[derive(Deserialize, Debug)]
struct AddressData {
    zipcode: String,
    prefecture: String,
    city: String,
    town: String,
    full_address: String,
}

#[derive(Deserialize, Debug)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Deserialize, Debug)]
struct MetricsResponse {
    total_requests: u64,
    requests_in_flight: u64,
    uptime_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = reqwest::Client::new();

    println!("=== zipcloud-rs HTTP API Client Demo ===\n");

    // 1. Health Check
    println!("1. Checking server health...");
    let health_url = format!("{}/health", base_url);
    let health: HealthResponse = client.get(&health_url).send().await?.json().await?;
    println!("   Server status: {}", health.status);
    println!("   Version: {}\n", health.version);

    // 2. Look up an address
    println!("2. Looking up 100-0001...");
    let lookup_url = format!("{}/api/lookup", base_url);
    let request = LookupRequest {
        postal_code: "100-0001".to_string(),
        policy: None, // fullwidth folding by default
    };

    match client.post(&lookup_url).json(&request).send().await {
        Ok(response) => {
            if response.status().is_success() {
                let result: LookupResponse = response.json().await?;
                println!("   Zipcode:    {}", result.data.zipcode);
                println!("   Prefecture: {}", result.data.prefecture);
                println!("   City:       {}", result.data.city);
                println!("   Town:       {}", result.data.town);
                println!("   Full:       {}\n", result.data.full_address);
            } else {
                let error_text = response.text().await?;
                println!("   Error: {}\n", error_text);
            }
        }
        Err(e) => {
            println!("   Request failed: {}\n", e);
        }
    }

    // 3. Invalid input is rejected before any upstream call
    println!("3. Submitting an invalid postal code...");
    let bad_request = LookupRequest {
        postal_code: "123".to_string(),
        policy: Some("ascii".to_string()),
    };
    let response = client.post(&lookup_url).json(&bad_request).send().await?;
    println!("   HTTP {}: {}\n", response.status(), response.text().await?);

    // 4. Get Metrics
    println!("4. Getting server metrics...");
    let metrics_url = format!("{}/api/metrics", base_url);
    let metrics: MetricsResponse = client.get(&metrics_url).send().await?.json().await?;
    println!("   Total requests: {}", metrics.total_requests);
    println!("   Requests in flight: {}", metrics.requests_in_flight);
    println!("   Uptime: {} seconds\n", metrics.uptime_seconds);

    println!("=== Demo Complete ===");

    Ok(())
}
