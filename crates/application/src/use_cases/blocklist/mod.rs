mod sync_blocklist;
mod update_blocklist;

pub use sync_blocklist::SyncBlocklistUseCase;
pub use update_blocklist::{BlocklistCommand, UpdateBlocklistUseCase};
