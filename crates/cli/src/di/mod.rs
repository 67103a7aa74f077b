mod blocklist;
mod engine;

pub use blocklist::BlocklistServices;
pub use engine::EngineServices;

use dnstrap_application::use_cases::ApplyDnsTrapUseCase;
use dnstrap_domain::Config;
use dnstrap_infrastructure::system::LogOnlyFirewall;
use std::sync::Arc;

/// Hands the trap addresses to the firewall manager so their DNS traffic is
/// routed into the virtual interface.
pub async fn apply_dns_trap(config: &Config) -> anyhow::Result<()> {
    let use_case = ApplyDnsTrapUseCase::new(Arc::new(LogOnlyFirewall::new()));
    use_case
        .execute(
            &config.interception.interface_name,
            &config.interception.trap_addresses,
        )
        .await?;
    Ok(())
}
