#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/avalanche-rush/rush-relay/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod monitor;
pub use monitor::{Trend, UsageMonitor, UsageSummary, BASELINE_COST_PER_ITEM, DEFAULT_HISTORY_CAP};
