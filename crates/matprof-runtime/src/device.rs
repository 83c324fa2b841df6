//! Devices: a name, a set of streams, and a buffer pool.

use std::sync::Arc;

use matprof_core::{MatprofError, Result};
use tracing::info;

use crate::backend::DeviceSpec;
use crate::pool::BufferPool;
use crate::stream::Stream;

/// One live device with its execution streams.
pub struct Device {
    index: usize,
    name: String,
    streams: Vec<Stream>,
    pool: Arc<BufferPool>,
}

impl Device {
    /// Bring up device `index` from its backend description, spawning one
    /// worker per stream.
    pub(crate) fn open(index: usize, spec: &DeviceSpec) -> Self {
        let streams = (0..spec.stream_count)
            .map(|s| Stream::spawn(index, s))
            .collect();
        info!(
            device = index,
            name = %spec.name,
            streams = spec.stream_count,
            "device opened"
        );
        Self {
            index,
            name: spec.name.clone(),
            streams,
            pool: Arc::new(BufferPool::new()),
        }
    }

    /// Device index within the engine.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Backend-reported device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of streams on this device.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Look up a stream by index.
    pub fn stream(&self, id: usize) -> Result<&Stream> {
        self.streams.get(id).ok_or(MatprofError::InvalidStream {
            id,
            device: self.index,
            count: self.streams.len(),
        })
    }

    /// This device's staging buffer pool.
    pub fn pool(&self) -> &Arc<BufferPool> {
        &self.pool
    }

    /// Wait for every stream to drain, then release pooled buffers.
    pub(crate) fn shutdown(&self) {
        for stream in &self.streams {
            stream.synchronize();
        }
        self.pool.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(streams: usize) -> DeviceSpec {
        DeviceSpec {
            name: "test-dev".to_string(),
            stream_count: streams,
        }
    }

    #[test]
    fn test_open_spawns_streams() {
        let dev = Device::open(0, &spec(3));
        assert_eq!(dev.stream_count(), 3);
        assert_eq!(dev.name(), "test-dev");
        for s in 0..3 {
            assert_eq!(dev.stream(s).unwrap().index(), s);
        }
    }

    #[test]
    fn test_stream_out_of_range() {
        let dev = Device::open(1, &spec(2));
        let err = dev.stream(2).unwrap_err();
        assert!(matches!(
            err,
            MatprofError::InvalidStream {
                id: 2,
                device: 1,
                count: 2
            }
        ));
    }

    #[test]
    fn test_streams_execute_work() {
        let dev = Device::open(0, &spec(2));
        let a = dev.stream(0).unwrap().run(|| 1);
        let b = dev.stream(1).unwrap().run(|| 2);
        assert_eq!(a + b, 3);
    }
}
