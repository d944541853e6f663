use anyhow::Result;
use zipcloud_rs::{NormalizePolicy, PostalCode, ZipcloudClient};

#[tokio::main]
async fn main() -> Result<()> {
    let client = ZipcloudClient::new()?;

    // Accepts separators and fullwidth digits
    let code = PostalCode::parse("１００-０００１", NormalizePolicy::FoldFullwidth)?;

    let address = client.lookup(&code).await?;

    println!("Postal code: {}", code);
    println!("Prefecture:  {}", address.prefecture);
    println!("City:        {}", address.city);
    println!("Town:        {}", address.town);
    println!("Full:        {}", address.full_address());

    Ok(())
}
