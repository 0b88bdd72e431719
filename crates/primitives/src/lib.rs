#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/avalanche-rush/rush-relay/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod event;
mod batch;
mod compressed_event;
mod submission_receipt;
mod usage_record;

pub use alloy_primitives::{Address, B256};
pub use batch::EventBatch;
pub use compressed_event::CompressedEvent;
pub use event::{now_millis, AttrKey, AttrValue, Attributes, EventKind, SemanticEvent};
pub use submission_receipt::SubmissionReceipt;
pub use usage_record::UsageRecord;
