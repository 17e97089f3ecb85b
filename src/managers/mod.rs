// tabwarden state managers
// Managers own stateful decisions: duplicate-check gating, notification throttling, tab reuse.

pub mod duplicate_check_tracker;
pub mod notification_tracker;
pub mod tab_orchestrator;
pub mod timers;
