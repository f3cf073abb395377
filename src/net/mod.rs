pub mod protocol;
pub mod snapshot_slot;
pub mod transport;
