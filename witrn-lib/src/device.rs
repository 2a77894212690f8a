use crate::constants::{ENDPOINT_IN, FRAME_LEN, WITRN_VID};
use crate::decoder::SampleDecoder;
use crate::error::WitrnError;
use crate::sample::Sample;
use nusb::{Interface, transfer::RequestBuffer};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};

// Bounded wait for a single HID report
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Where to find the meter and how long to wait for a frame.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    pub interface: u8,
    pub endpoint_in: u8,
    pub read_timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: WITRN_VID,
            interface: 0,
            endpoint_in: ENDPOINT_IN,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl DeviceConfig {
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// Identification of an attached meter, as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus_number: u8,
    pub device_address: u8,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial: Option<String>,
}

/// List every attached device with the given vendor ID.
pub fn list_devices(vendor_id: u16) -> Result<Vec<DeviceSummary>, WitrnError> {
    let devices = nusb::list_devices()?
        .filter(|d| d.vendor_id() == vendor_id)
        .map(|d| DeviceSummary {
            vendor_id: d.vendor_id(),
            product_id: d.product_id(),
            bus_number: d.bus_number(),
            device_address: d.device_address(),
            manufacturer: d.manufacturer_string().map(str::to_owned),
            product: d.product_string().map(str::to_owned),
            serial: d.serial_number().map(str::to_owned),
        })
        .collect();
    Ok(devices)
}

/// Connection to a WITRN meter plus the decoding session for its stream.
pub struct WitrnMeter {
    interface: Interface,
    config: DeviceConfig,
    decoder: SampleDecoder,
}

impl WitrnMeter {
    /// Connect to the first attached meter with the default configuration
    pub async fn new() -> Result<Self, WitrnError> {
        Self::with_config(DeviceConfig::default()).await
    }

    pub async fn with_config(config: DeviceConfig) -> Result<Self, WitrnError> {
        info!("Searching for WITRN meter (VID {:#06x})...", config.vendor_id);
        let device_info = nusb::list_devices()?
            .find(|d| d.vendor_id() == config.vendor_id)
            .ok_or(WitrnError::DeviceNotFound)?;

        info!(
            "Found device {:#06x}:{:#06x} on bus {} addr {}",
            device_info.vendor_id(),
            device_info.product_id(),
            device_info.bus_number(),
            device_info.device_address()
        );

        let device = device_info.open()?;
        let interface = device.detach_and_claim_interface(config.interface)?;
        info!("Interface claimed successfully.");

        Ok(Self {
            interface,
            config,
            decoder: SampleDecoder::new(),
        })
    }

    /// Read one raw report. Not retried: a timeout or USB failure is returned
    /// as-is and the caller decides what to do next.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>, WitrnError> {
        let transfer = self
            .interface
            .interrupt_in(self.config.endpoint_in, RequestBuffer::new(FRAME_LEN));
        let completion = timeout(self.config.read_timeout, transfer).await?;
        let data = completion.into_result()?;
        debug!(bytes = hex::encode(&data), "USB Read");
        Ok(data)
    }

    /// Read and decode the next sample.
    pub async fn read_sample(&mut self) -> Result<Sample, WitrnError> {
        let frame = self.read_frame().await?;
        Ok(self.decoder.decode(&frame)?)
    }
}
