use std::env;

use anyhow::Result;
use zipcloud_rs::{AddressLookupController, NormalizePolicy, UiState, ZipcloudClient};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <postal_code> [policy]", args[0]);
        eprintln!("  postal_code: 7-digit Japanese postal code (e.g., 100-0001)");
        eprintln!("  policy: fullwidth, ascii (default: fullwidth)");
        std::process::exit(1);
    }

    let policy = match args.get(2) {
        Some(s) => match NormalizePolicy::parse(s) {
            Some(policy) => policy,
            None => {
                eprintln!("Unknown policy: {}. Using fullwidth.", s);
                NormalizePolicy::default()
            }
        },
        None => NormalizePolicy::default(),
    };

    let client = ZipcloudClient::new()?;

    let mut controller = AddressLookupController::with_policy(policy);
    controller.on_input_change(&args[1]);
    controller.submit_with(&client).await;

    match controller.state() {
        UiState::Success(address) => {
            println!("Prefecture: {}", address.prefecture);
            println!("City:       {}", address.city);
            println!("Town:       {}", address.town);
            println!("Address:    {}", address.full_address());
        }
        UiState::Error(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
        // submit_with always settles into Success or Error
        UiState::Idle | UiState::Loading => unreachable!(),
    }

    Ok(())
}
