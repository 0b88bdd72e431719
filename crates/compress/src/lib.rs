#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/avalanche-rush/rush-relay/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod encode;
pub use encode::{compress, PACKED_INT_MARKER, WRAPPED_NUM_MARKER};
