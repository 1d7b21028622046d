//! Tick loop that filters samples and relays them to the session peer

use crate::config::{AppConfig, MotionConfig};
use crate::error::Result;
use crate::filter::SensorHistory;
use crate::sensors::SampleSource;
use crate::session::{local_ipv4, Token, UdpChannel};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Moving average after the update
    pub average: Vec<f64>,
    /// Filtered speed in units per unit of time
    pub velocity: f64,
    /// Debounced motion classification
    pub moving: Option<bool>,
    /// Containment in the reference area, once pinned
    pub in_reference_area: Option<bool>,
    /// Whether the average reached the peer's socket
    pub sent: bool,
    /// Last application payload received from the peer this tick
    pub inbound: Option<Vec<u8>>,
}

/// Composes one sensor history and one UDP channel
pub struct TelemetryRelay {
    history: SensorHistory,
    channel: UdpChannel,
    motion: MotionConfig,
    connect_timeout: Duration,
    send_timeout: Duration,
    ping_timeout: Duration,
}

impl TelemetryRelay {
    /// Create a relay from already constructed parts
    pub fn new(history: SensorHistory, channel: UdpChannel, config: &AppConfig) -> Self {
        TelemetryRelay {
            history,
            channel,
            motion: config.motion.clone(),
            connect_timeout: config.session.connect_timeout(),
            send_timeout: config.session.send_timeout(),
            ping_timeout: config.session.ping_timeout(),
        }
    }

    /// Build the filter and bind the channel described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let history =
            SensorHistory::new(config.filter.history_size, config.filter.number_of_parameter)?;
        let ip = config.session.bind_ip.unwrap_or_else(local_ipv4);
        let channel = UdpChannel::bind(SocketAddr::new(IpAddr::V4(ip), config.session.port))?;
        Ok(Self::new(history, channel, config))
    }

    /// Filter state
    pub fn history(&self) -> &SensorHistory {
        &self.history
    }

    /// Session channel
    pub fn channel(&self) -> &UdpChannel {
        &self.channel
    }

    /// Session channel, for connect and teardown
    pub fn channel_mut(&mut self) -> &mut UdpChannel {
        &mut self.channel
    }

    /// Handshake with a peer listening on the same port as this relay
    pub fn connect_peer(&mut self, ip: IpAddr) -> bool {
        self.channel.connect_ip(ip, self.connect_timeout)
    }

    /// Round-trip time to the current peer
    pub fn ping(&mut self) -> Option<Duration> {
        self.channel.ping(self.ping_timeout)
    }

    /// Feed one raw sample through the filter and relay the result
    pub fn tick(&mut self, sample: &[f64]) -> Result<TickReport> {
        self.history.update(sample)?;

        if let Some(radius) = self.motion.reference_radius {
            if self.history.reference_area().is_none() && self.history.is_filled() {
                self.history.set_reference_area(radius);
                log::info!("Reference area pinned with radius {}", radius);
            }
        }

        let velocity = self.history.velocity(self.motion.sampling_rate);
        let moving = self.history.is_moving(
            self.motion.velocity_threshold,
            self.motion.min_n_samples,
            self.motion.sampling_rate,
        );
        let in_reference_area = self.history.is_in_reference_area();

        let inbound = self
            .channel
            .drain_payloads()
            .into_iter()
            .filter(|data| Token::parse(data).is_none())
            .last();

        let average = self.history.moving_average().as_slice().to_vec();
        let sent = self.channel.is_connected()
            && self
                .channel
                .send(encode_values(&average).as_bytes(), self.send_timeout);

        Ok(TickReport {
            average,
            velocity,
            moving,
            in_reference_area,
            sent,
            inbound,
        })
    }

    /// Drive the tick loop until `source` is exhausted; returns the tick count
    pub fn run<S: SampleSource>(&mut self, source: &mut S) -> Result<usize> {
        log::info!("Relaying samples from {} via {}", source.name(), self.channel);

        let mut ticks = 0;
        while let Some(sample) = source.next_sample()? {
            let report = self.tick(&sample)?;
            ticks += 1;
            log::debug!(
                "tick {}: velocity={:.3} moving={:?} sent={}",
                ticks,
                report.velocity,
                report.moving,
                report.sent
            );
        }
        Ok(ticks)
    }

    /// Tear down the session, if any
    pub fn shutdown(&mut self) {
        self.channel.disconnect();
    }
}

/// ASCII payload carrying one filtered sample
pub fn encode_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::LineSampleSource;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn relay(config: &AppConfig) -> TelemetryRelay {
        let history =
            SensorHistory::new(config.filter.history_size, config.filter.number_of_parameter)
                .unwrap();
        let channel = UdpChannel::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        TelemetryRelay::new(history, channel, config)
    }

    #[test]
    fn test_encode_values() {
        assert_eq!(encode_values(&[1.0, -2.5, 0.125]), "1,-2.5,0.125");
    }

    #[test]
    fn test_tick_without_peer() {
        let mut config = AppConfig::default();
        config.filter.history_size = 1;
        config.motion.reference_radius = Some(1.0);
        let mut relay = relay(&config);

        let report = relay.tick(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(report.average, vec![1.0, 2.0, 3.0]);
        assert!(!report.sent);
        assert_eq!(report.inbound, None);
        assert_eq!(report.moving, None);
        assert_eq!(report.in_reference_area, Some(true));

        assert!(relay.tick(&[1.0]).is_err());
    }

    #[test]
    fn test_reference_area_pinned_once_window_fills() {
        let mut config = AppConfig::default();
        config.motion.reference_radius = Some(1.0);
        let mut relay = relay(&config);

        for tick in 1..=10 {
            let report = relay.tick(&[100.0, 0.0, 0.0]).unwrap();
            if tick < config.filter.history_size {
                assert_eq!(report.in_reference_area, None);
            } else {
                assert_eq!(report.in_reference_area, Some(true));
            }
        }
        let area = relay.history().reference_area().unwrap();
        assert_relative_eq!(area.center()[0], 100.0, epsilon = 1e-9);
        assert_relative_eq!(area.center()[1], 0.0);
    }

    #[test]
    fn test_run_counts_ticks() {
        let mut config = AppConfig::default();
        config.filter.number_of_parameter = 2;
        let mut relay = relay(&config);

        let mut source = LineSampleSource::new("test", Cursor::new("1 1\n2 2\n3 3\n"));
        assert_eq!(relay.run(&mut source).unwrap(), 3);
        assert_eq!(relay.history().history().back().unwrap().as_slice(), &[3.0, 3.0]);
    }
}
