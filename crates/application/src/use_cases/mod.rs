pub mod blocklist;
pub mod cache;
pub mod firewall;

pub use blocklist::{BlocklistCommand, SyncBlocklistUseCase, UpdateBlocklistUseCase};
pub use cache::GetCacheStatsUseCase;
pub use firewall::ApplyDnsTrapUseCase;
