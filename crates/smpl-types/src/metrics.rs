//! # smpl-types::metrics
//!
//! Centralized metric name/label constants, so the kernel (where metrics are
//! emitted) and any external consumer agree on spelling.

// --- Metric names ---
pub const MET_EVENTS_SCHEDULED: &str = "smpl_events_scheduled_total";
pub const MET_EVENTS_CAUSED: &str = "smpl_events_caused_total";
pub const MET_EVENTS_CANCELLED: &str = "smpl_events_cancelled_total";
pub const MET_FACILITY_REQUESTS: &str = "smpl_facility_requests_total";
pub const MET_FACILITY_QUEUED: &str = "smpl_facility_queued_total";
pub const MET_FACILITY_PREEMPTS: &str = "smpl_facility_preempts_total";
pub const MET_FACILITY_RELEASES: &str = "smpl_facility_releases_total";
pub const MET_QUEUE_LEN_GAUGE: &str = "smpl_facility_queue_len";
pub const MET_BUSY_SERVERS_GAUGE: &str = "smpl_facility_busy_servers";

// --- Label keys ---
pub const LBL_FACILITY: &str = "facility";
pub const LBL_EVENT: &str = "event";
pub const LBL_OUTCOME: &str = "outcome";
