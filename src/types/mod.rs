/// EVM <-> arbitrary-precision conversions and hex parsing
pub mod conversions;
/// Asset keys, transfer records and flow events
pub mod transfer;

pub use transfer::{AssetKey, FlowDirection, FlowEvent, TransferRecord};
