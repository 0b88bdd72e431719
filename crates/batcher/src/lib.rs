#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/avalanche-rush/rush-relay/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{BatcherConfig, BatcherConfigBuilder};

mod error;
pub use error::BatcherError;

mod queue;
pub use queue::{BatchQueue, FlushTrigger};

mod service;
pub use service::{EventBatcher, FlushOutcome, SubmitOutcome, IMMEDIATE_PRIORITY};
