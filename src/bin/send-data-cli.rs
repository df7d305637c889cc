use std::io::Read;

use clap::Parser;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "send-data-cli")]
#[command(about = "Post a JSON document to a running data receiver", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    url: String,

    /// JSON document to send. Read from stdin when omitted or `-`.
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let payload = read_payload(cli.data.as_deref(), std::io::stdin())?;

    let res = reqwest::Client::new()
        .post(format!("{}/send-data", cli.url.trim_end_matches('/')))
        .json(&payload)
        .send()
        .await?;

    print_response(res).await
}

/// Parse the document from the argument, or from `stdin` when it is absent or `-`.
fn read_payload(data: Option<&str>, mut stdin: impl Read) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = match data {
        Some("-") | None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            buf
        }
        Some(text) => text.to_string(),
    };

    let payload = serde_json::from_str(&raw)
        .map_err(|e| format!("input is not valid JSON: {}", e))?;
    Ok(payload)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprintln!("Response: {}", text);
        return Err(format!("request failed with status {}", status).into());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
