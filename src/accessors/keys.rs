//! Base keys shared by accessors and their invalidation helpers.
//!
//! Trainer-scoped keys share the `pt_` prefix so the whole family can be
//! dropped with one pattern clear.

pub const USER_PROFILE: &str = "user_profile";
pub const USER_ENTITLEMENTS: &str = "user_entitlements";
pub const CLIENT_ASSIGNMENTS: &str = "client_assignments";

pub const TRAINER_PREFIX: &str = "pt_";
pub const PT_PROGRAMS: &str = "pt_programs";
pub const PT_TEMPLATES: &str = "pt_templates";
pub const PT_CLIENTS: &str = "pt_clients";

pub const WORKOUT_PROGRAMS: &str = "workout_programs";
pub const PUBLISHED_ARTICLES: &str = "published_articles";
pub const ADMIN_STATS: &str = "admin_stats";

/// Parameter names
pub const PARAM_USER_ID: &str = "user_id";
pub const PARAM_TRAINER_ID: &str = "trainer_id";
pub const PARAM_LIMIT: &str = "limit";
