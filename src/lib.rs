#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_serial as serial;

pub use vc_serial::derive::Serial;
pub use vc_serial::{from_json, from_xml, from_binary, from_portable_binary};
pub use vc_serial::{named, to_binary, to_json, to_portable_binary, to_xml};
