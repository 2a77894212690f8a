use anyhow::{Context, Result};
use tracing::info;
use witrn_lib::constants::WITRN_VID;
use witrn_lib::device::list_devices;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    info!("Listing WITRN meters (VID {:#06x})...", WITRN_VID);
    let devices = list_devices(WITRN_VID).context("Failed to list USB devices")?;

    if devices.is_empty() {
        info!("No WITRN meters found.");
        return Ok(());
    }

    for (i, device) in devices.iter().enumerate() {
        info!(
            "Device #{}: VID: {:#06x}, PID: {:#06x}, Bus: {:03}, Address: {:03}",
            i + 1,
            device.vendor_id,
            device.product_id,
            device.bus_number,
            device.device_address
        );
        info!("  Manufacturer: {}", device.manufacturer.as_deref().unwrap_or("<Not available>"));
        info!("  Product: {}", device.product.as_deref().unwrap_or("<Not available>"));
        info!("  Serial: {}", device.serial.as_deref().unwrap_or("<Not available>"));
    }
    Ok(())
}
