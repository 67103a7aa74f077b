mod stats;
#[cfg(target_os = "linux")]
mod tun;

pub use stats::spawn_stats_reporter;

use dnstrap_application::ports::VirtualInterfacePort;
use dnstrap_domain::config::InterceptionConfig;
use std::sync::Arc;

#[cfg(target_os = "linux")]
pub fn open_interface(config: &InterceptionConfig) -> anyhow::Result<Arc<dyn VirtualInterfacePort>> {
    let tun = tun::TunInterface::open(&config.interface_name, config.mtu)?;
    Ok(Arc::new(tun))
}

#[cfg(not(target_os = "linux"))]
pub fn open_interface(config: &InterceptionConfig) -> anyhow::Result<Arc<dyn VirtualInterfacePort>> {
    anyhow::bail!(
        "virtual interface {} requires Linux TUN support",
        config.interface_name
    )
}
