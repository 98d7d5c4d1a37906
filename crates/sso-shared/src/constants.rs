//! Application-wide constants
//!
//! Token kind strings and portal ids are shared with the portals, so changing
//! any of them is a protocol change.

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
pub const TOKEN_TYPE_SSO: &str = "sso";

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 3600;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604800;
pub const DEFAULT_SSO_TOKEN_EXPIRY: i64 = 900;
pub const DEFAULT_TOKEN_ISSUER: &str = "crm-auth-gateway";

pub const PORTAL_ADMISSIONS_CRM: &str = "admissions-crm";
pub const PORTAL_STUDENT: &str = "student-portal";
pub const PORTAL_HOSTEL_AUTOMATION: &str = "hostel-automation";
pub const PORTAL_HRMS: &str = "hrms";
pub const PORTAL_PHARMACY: &str = "pharmacy";

/// Role given to identities whose store carries no role of its own
pub const DEFAULT_ROLE: &str = "user";
pub const STUDENT_ROLE: &str = "student";

/// Query parameter the portal reads the sealed token from
pub const PORTAL_TOKEN_QUERY_PARAM: &str = "token";

pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 3000;
