use anyhow::{Context, Result};
use std::io::Write;
use std::net::IpAddr;
use trak_relay::sensors::LineSampleSource;
use trak_relay::{AppConfig, TelemetryRelay};

fn main() -> Result<()> {
    // Optional config path as the only argument
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => AppConfig::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    })
    .init();

    log::info!("Initializing telemetry relay...");

    let mut relay = TelemetryRelay::from_config(&config).context("Failed to start relay")?;

    if let Some(peer) = config.session.peer {
        if relay.connect_peer(IpAddr::V4(peer)) {
            match relay.ping() {
                Some(rtt) => log::info!("Peer {} answered ping in {:?}", peer, rtt),
                None => log::warn!("Peer {} did not answer ping", peer),
            }
        } else {
            log::warn!("Could not connect to {}, waiting for a peer instead", peer);
        }
    }

    let stdin = std::io::stdin();
    let mut source = LineSampleSource::new("stdin", stdin.lock());
    let result = relay.run(&mut source);

    relay.shutdown();
    let ticks = result.context("Relay stopped")?;
    log::info!("Relayed {} samples", ticks);
    Ok(())
}
