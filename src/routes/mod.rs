//! HTTP surface of the notifier.  Only mounted when `STATUS_ADDR` is set.

pub mod status;
