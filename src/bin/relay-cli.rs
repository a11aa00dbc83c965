use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use reqwest::header::CONTENT_TYPE;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send test traffic through a running webhook relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one HTTP request and print the relay's answer
    Send {
        #[arg(short, long, default_value = "POST")]
        method: String,
        /// Path appended to the relay URL
        #[arg(short, long, default_value = "/")]
        path: String,
        #[arg(short, long)]
        content_type: Option<String>,
        #[arg(short, long, default_value = "")]
        body: String,
    },
    /// Open a WebSocket, send one message and print the echo
    Ws {
        #[arg(short, long)]
        message: String,
        /// Seconds to wait for the echo
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Send {
            method,
            path,
            content_type,
            body,
        } => {
            let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())?;
            let mut request = reqwest::Client::new()
                .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
                .body(body);
            if let Some(content_type) = content_type {
                request = request.header(CONTENT_TYPE, content_type);
            }

            let res = request.send().await?;
            let status = res.status();
            let text = res.text().await?;
            if status.is_success() {
                println!("{} {}", status.as_u16(), text);
            } else {
                eprintln!("Error: relay returned status {}", status);
                eprintln!("Response: {}", text);
            }
        }
        Commands::Ws { message, timeout } => {
            let ws_url = websocket_url(&cli.url)?;
            let (mut stream, _) = connect_async(ws_url.as_str()).await?;
            stream.send(Message::Text(message.into())).await?;

            let reply = tokio::time::timeout(Duration::from_secs(timeout), async {
                while let Some(frame) = stream.next().await {
                    if let Message::Text(text) = frame? {
                        return Ok::<_, tungstenite::Error>(Some(text.to_string()));
                    }
                }
                Ok(None)
            })
            .await??;

            match reply {
                Some(text) => println!("{}", text),
                None => eprintln!("Error: connection closed before echo"),
            }
            let _ = stream.close(None).await;
        }
    }

    Ok(())
}

/// Map an http(s) relay URL to its ws(s) equivalent.
fn websocket_url(relay_url: &str) -> Result<url::Url, Box<dyn std::error::Error>> {
    let mut url = url::Url::parse(relay_url)?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| format!("cannot use '{}' as a WebSocket URL", relay_url))?;
    Ok(url)
}
