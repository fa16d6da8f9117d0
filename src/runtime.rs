// 10 Hz control loop hosting the claw controller and its remote surface
// Remote calls are drained between ticks on the same task, so the controller
// is only ever touched from one place. Gripper phases block this task for
// their whole duration, joystick polling included.

use tokio::task::block_in_place;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

// local imports
use crate::config::{ClawConfig, LOOP_PERIOD, TOPIC_FN, TOPIC_LIVES, TOPIC_STATUS};
use crate::controller::ClawController;
use crate::hw::{Board, BlockingDelay, Delay, RpiBoard, SimBoard};
use crate::lives::Lives;
use crate::remote::{function_from_key, RemoteHandler};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// I/O backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Raspberry Pi GPIO + MCP3208 joystick ADC
    Rpi,
    /// In-memory board (centered stick, trigger released)
    Sim,
}

pub async fn run(cfg: ClawConfig, backend: Backend) -> Result<(), BoxError> {
    cfg.validate()?;
    let lives = Lives::new(cfg.initial_lives);
    let remote = RemoteHandler::new(lives.clone());

    match backend {
        Backend::Rpi => {
            let board = RpiBoard::new(&cfg.pins)?;
            serve(ClawController::new(board, BlockingDelay, &cfg, lives), remote).await
        }
        Backend::Sim => {
            warn!("Running against the simulated board, no hardware will move");
            serve(ClawController::new(SimBoard::new(), BlockingDelay, &cfg, lives), remote).await
        }
    }
}

async fn serve<B: Board, D: Delay>(
    mut claw: ClawController<B, D>,
    remote: RemoteHandler,
) -> Result<(), BoxError> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up queryable and publishers...");
    let queryable = session.declare_queryable(TOPIC_FN).await?;
    let pub_status = session.declare_publisher(TOPIC_STATUS).await?;
    let pub_lives = session.declare_publisher(TOPIC_LIVES).await?;

    let mut tick = interval(LOOP_PERIOD);
    // A blocking gripper sequence must not be followed by a burst of catch-up ticks
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Runtime started: {}ms loop", LOOP_PERIOD.as_millis());
    info!("Serving remote functions on: {}", TOPIC_FN);
    info!("Publishing to: {}, {}", TOPIC_STATUS, TOPIC_LIVES);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                block_in_place(|| claw.halt())?;
                return Ok(());
            }
        }

        // 1. Serve all pending remote calls
        while let Ok(Some(query)) = queryable.try_recv() {
            let function = function_from_key(query.key_expr().as_str()).to_string();
            let arg = query
                .payload()
                .map(|p| String::from_utf8_lossy(&p.to_bytes()).into_owned())
                .unwrap_or_default();

            let reply = block_in_place(|| remote.handle(&function, &arg, &mut claw))?;
            let reply_json = serde_json::to_string(&reply)?;
            query.reply(query.key_expr().clone(), reply_json).await?;
        }

        // 2. Control tick (blocks for a full gripper sequence when triggered)
        block_in_place(|| claw.tick())?;

        // 3. Publish lives and status
        pub_lives.put(claw.lives().get().to_string()).await?;
        let status_json = serde_json::to_string(&claw.status())?;
        pub_status.put(status_json).await?;
    }
}
