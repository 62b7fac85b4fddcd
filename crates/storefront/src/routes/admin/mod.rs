//! Staff-only handlers. Every handler takes `RequireStaff`.

pub mod enquiries;
pub mod kpi;
pub mod orders;
