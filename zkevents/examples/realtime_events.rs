//! Live attendance feed example

use zkevents::{Client, DeviceEvent};

#[tokio::main]
async fn main() -> zkevents::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Change to your device IP
    let ip = std::env::var("DEVICE_IP").unwrap_or_else(|_| "192.168.1.201".to_string());

    println!("Connecting to {}...", ip);

    let (client, mut events) = Client::connect_events(ip, 4370).await?;
    println!("Connected (session {})", client.session_id());

    client.enable_events().await?;
    println!("Real-time events enabled, waiting for transactions...");

    while let Some(event) = events.recv().await {
        match event {
            DeviceEvent::Transaction(record) => println!("{record}"),
            DeviceEvent::Error(error) => eprintln!("fault: {error}"),
            DeviceEvent::Disconnected => break,
            DeviceEvent::Connected => {}
        }
    }

    Ok(())
}
