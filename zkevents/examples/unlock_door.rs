//! Door unlock example

use zkevents::Client;

#[tokio::main]
async fn main() -> zkevents::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let ip = std::env::var("DEVICE_IP").unwrap_or_else(|_| "192.168.1.201".to_string());

    let (client, _events) = Client::connect_events(ip, 4370).await?;
    println!("Connected!");

    client.unlock_door(5).await?;
    println!("Door open for 5 seconds");

    client.disconnect().await?;
    println!("Done!");

    Ok(())
}
