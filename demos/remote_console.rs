// Keyboard calibration console: L/R lower/raise, O/C open/close, +/- lives, [/] phase time, Q quit
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tiny_claw_runtime::config::TOPIC_FN_PREFIX;
use tiny_claw_runtime::messages::RemoteReply;
use tracing::{info, warn};

const PHASE_MS: [u64; 4] = [100, 300, 500, 1000];
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Controls: L/R=lower/raise, O/C=open/close, +/-=lives, [/]=phase time, Q=quit");
    print_phase(0);

    enable_raw_mode()?;
    let result = run_console(&session).await;
    disable_raw_mode()?;

    result
}

async fn run_console(
    session: &zenoh::Session,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut phase_idx: usize = 0;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        let phase_ms = PHASE_MS[phase_idx].to_string();
        match code {
            KeyCode::Char('l') => call(session, "lower_gripper", &phase_ms).await?,
            KeyCode::Char('r') => call(session, "raise_gripper", &phase_ms).await?,
            KeyCode::Char('o') => call(session, "open_gripper", &phase_ms).await?,
            KeyCode::Char('c') => call(session, "close_gripper", &phase_ms).await?,
            KeyCode::Char('+') => call(session, "add_lives", "1").await?,
            KeyCode::Char('-') => call(session, "add_lives", "-1").await?,

            KeyCode::Char(']') => {
                phase_idx = (phase_idx + 1).min(PHASE_MS.len() - 1);
                print_phase(phase_idx);
            }
            KeyCode::Char('[') => {
                phase_idx = phase_idx.saturating_sub(1);
                print_phase(phase_idx);
            }

            KeyCode::Char('q') | KeyCode::Esc => break,
            _ => {}
        }
    }

    Ok(())
}

async fn call(
    session: &zenoh::Session,
    function: &str,
    arg: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let key = format!("{}/{}", TOPIC_FN_PREFIX, function);
    let replies = session
        .get(key.as_str())
        .payload(arg.to_string())
        .timeout(REPLY_TIMEOUT)
        .await?;

    while let Ok(reply) = replies.recv_async().await {
        match reply.result() {
            Ok(sample) => {
                let reply: RemoteReply = serde_json::from_slice(&sample.payload().to_bytes())?;
                info!(
                    "{}({}) -> {} (lives: {})",
                    reply.function, arg, reply.return_value, reply.lives
                );
            }
            Err(err) => warn!("{} failed: {:?}", function, err),
        }
    }
    Ok(())
}

fn print_phase(idx: usize) {
    info!("Phase time: {} ms", PHASE_MS[idx]);
}
