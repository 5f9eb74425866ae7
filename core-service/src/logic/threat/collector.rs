//! Advertisement Collector
//!
//! Aggregates BLE advertisements over one scan cycle and turns them into a
//! `BluetoothScan`. One entry per address, latest advertisement wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::bluetooth::{scan_timestamp, BluetoothThreatResolver};
use super::types::BluetoothScan;

/// One received advertisement packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub address: String,
    pub name: Option<String>,
    pub local_name: Option<String>,
    pub rssi: i16,
}

impl Advertisement {
    /// `name`, then `local_name`, then the address itself
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.local_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or(&self.address)
    }
}

#[derive(Debug, Default)]
pub struct AdvertisementCollector {
    resolver: BluetoothThreatResolver,
    cycle: HashMap<String, Advertisement>,
    iteration: u64,
}

impl AdvertisementCollector {
    pub fn new(resolver: BluetoothThreatResolver) -> Self {
        Self {
            resolver,
            cycle: HashMap::new(),
            iteration: 0,
        }
    }

    /// Record an advertisement. Returns false when it was discarded.
    pub fn observe(&mut self, advertisement: Advertisement) -> bool {
        if advertisement.rssi >= 0 {
            return false;
        }
        self.cycle.insert(advertisement.address.clone(), advertisement);
        true
    }

    /// Devices seen so far in the current cycle
    pub fn pending(&self) -> usize {
        self.cycle.len()
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Close the cycle: assess every device and start an empty one
    pub fn finish_cycle(&mut self) -> BluetoothScan {
        self.iteration += 1;

        let mut devices: Vec<_> = self
            .cycle
            .drain()
            .map(|(address, adv)| {
                self.resolver
                    .resolve_with_address(&address, adv.rssi, adv.display_name())
            })
            .collect();
        devices.sort_by(|a, b| a.address.cmp(&b.address));

        log::info!("Live scan {} finished: {} devices", self.iteration, devices.len());

        BluetoothScan {
            scan_time: scan_timestamp(),
            iteration: self.iteration,
            devices_detected: devices.len(),
            devices,
        }
    }
}
