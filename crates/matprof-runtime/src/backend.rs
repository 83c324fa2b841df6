//! Accelerator backends: device enumeration.
//!
//! A backend only describes what hardware exists; the manager turns the
//! description into live [`Device`](crate::device::Device)s with running
//! stream workers.

/// Description of one enumerable device.
#[derive(Debug, Clone)]
pub struct DeviceSpec {
    /// Human-readable device name.
    pub name: String,
    /// Number of independent execution streams the device offers.
    pub stream_count: usize,
}

/// A source of devices for the resource manager.
pub trait AcceleratorBackend: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Enumerate all physical devices, in stable order.
    fn probe(&self) -> Vec<DeviceSpec>;
}

/// Host-CPU backend: a single device whose stream count is the machine's
/// available parallelism.
#[derive(Debug, Default)]
pub struct HostBackend;

impl AcceleratorBackend for HostBackend {
    fn name(&self) -> &str {
        "host"
    }

    fn probe(&self) -> Vec<DeviceSpec> {
        let streams = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        vec![DeviceSpec {
            name: "host-cpu".to_string(),
            stream_count: streams,
        }]
    }
}

/// Configurable fake backend.
///
/// Exposes `devices` identical devices with `streams` streams each. Kernels
/// still run (on host threads), so this is suitable for multi-device tests
/// and for measuring dispatch overhead without real hardware.
#[derive(Debug, Clone)]
pub struct StubBackend {
    devices: usize,
    streams: usize,
}

impl StubBackend {
    /// Create a stub backend with the given topology.
    pub fn new(devices: usize, streams: usize) -> Self {
        Self { devices, streams }
    }
}

impl AcceleratorBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn probe(&self) -> Vec<DeviceSpec> {
        (0..self.devices)
            .map(|i| DeviceSpec {
                name: format!("stub-{i}"),
                stream_count: self.streams,
            })
            .collect()
    }
}
