use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    browser_api::bridge::BridgeBrowser,
    messaging::{InboundMessage, OutboundMessage},
    utils::clock::{Clock, DefaultClock},
};

use accounting::accountant::TimeAccountant;
use config::AccountantConfig;
use presentation::MessagingPresenter;
use scheduler::Scheduler;
use storage::{kv_store::JsonFileStore, tally_store::TallyStore};

pub mod accounting;
pub mod args;
pub mod config;
pub mod presentation;
pub mod scheduler;
pub mod shutdown;
pub mod storage;
pub mod transport;

const INBOUND_CAPACITY: usize = 32;

/// Represents the starting point for the native messaging host. Browser messages are read from
/// stdin and commands are written to stdout.
pub async fn start_host(dir: PathBuf, config: AccountantConfig) -> Result<()> {
    let (inbound_sender, inbound_receiver) = mpsc::channel::<InboundMessage>(INBOUND_CAPACITY);
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<OutboundMessage>();

    let shutdown_token = CancellationToken::new();

    outbound_sender.send(OutboundMessage::Configure {
        idle_threshold_seconds: config.idle_threshold_seconds,
    })?;

    let scheduler = create_scheduler(
        dir.join("storage"),
        inbound_receiver,
        outbound_sender,
        &shutdown_token,
        config,
        DefaultClock,
    )?;

    let (_, _, writing_result, scheduler_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        transport::forward_inbound(tokio::io::stdin(), inbound_sender, shutdown_token.clone()),
        transport::write_outbound(tokio::io::stdout(), outbound_receiver),
        scheduler.run(),
    );

    if let Err(writing_result) = writing_result {
        error!("Writing to the browser failed {:?}", writing_result);
    }

    if let Err(scheduler_result) = scheduler_result {
        error!("Scheduler finished with an error {:?}", scheduler_result);
    }

    Ok(())
}

fn create_scheduler(
    storage_dir: PathBuf,
    inbound: mpsc::Receiver<InboundMessage>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    shutdown_token: &CancellationToken,
    config: AccountantConfig,
    clock: impl Clock,
) -> Result<Scheduler<JsonFileStore, MessagingPresenter, BridgeBrowser>> {
    let store = TallyStore::new(JsonFileStore::new(storage_dir)?);
    let accountant = TimeAccountant::new(store, MessagingPresenter::new(outbound), config);
    Ok(Scheduler::new(
        accountant,
        BridgeBrowser::new(),
        inbound,
        shutdown_token.clone(),
        Box::new(clock),
    ))
}
