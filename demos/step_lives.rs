// Grant lives earned from walking: every 5 steps buys one life
//
// Usage: cargo run --example step_lives -- --steps 1200
use std::time::Duration;

use clap::Parser;
use tiny_claw_runtime::config::TOPIC_FN_PREFIX;
use tiny_claw_runtime::messages::RemoteReply;
use tracing::{info, warn};

const STEPS_PER_LIFE: u64 = 5;

#[derive(Debug, Parser)]
struct Args {
    /// Step count to convert
    #[arg(long)]
    steps: u64,
}

fn steps_to_lives(steps: u64) -> i32 {
    (steps / STEPS_PER_LIFE).min(i32::MAX as u64) as i32
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let lives = steps_to_lives(args.steps);
    if lives == 0 {
        info!("{} steps is not enough for a life", args.steps);
        return Ok(());
    }

    let session = zenoh::open(zenoh::Config::default()).await?;
    let key = format!("{}/add_lives", TOPIC_FN_PREFIX);
    let replies = session
        .get(key.as_str())
        .payload(lives.to_string())
        .timeout(Duration::from_secs(10))
        .await?;

    let mut answered = false;
    while let Ok(reply) = replies.recv_async().await {
        answered = true;
        match reply.result() {
            Ok(sample) => {
                let reply: RemoteReply = serde_json::from_slice(&sample.payload().to_bytes())?;
                if reply.is_ok() {
                    info!("Sent {} lives, cabinet now has {}", lives, reply.lives);
                } else {
                    warn!("Cabinet rejected the request (return value {})", reply.return_value);
                }
            }
            Err(err) => warn!("add_lives failed: {:?}", err),
        }
    }
    if !answered {
        warn!("No cabinet answered on {}", key);
    }
    Ok(())
}
