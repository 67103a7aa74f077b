pub mod firewall;
pub mod memory_interface;
pub mod pass_through;

pub use firewall::LogOnlyFirewall;
pub use memory_interface::{MemoryInterface, MemoryInterfaceHandle};
pub use pass_through::{CollectingPassThrough, DroppingPassThrough};
