//! Shared constants for end-to-end tests
//!
//! When test users or tokens change, update only this file.

// ============================================================================
// Test Users
// ============================================================================

/// The user most tests act as
pub const TEST_USER: &str = "testuser";

/// Bearer token issued to `TEST_USER`
pub const TEST_USER_TOKEN: &str =
    "testusertoken0000000000000000000000000000000000000000000000000001";

/// Other users, each with its own token, used to populate shared media
pub const OTHER_USERS: [(&str, &str); 3] = [
    (
        "alice",
        "alicetoken000000000000000000000000000000000000000000000000000002",
    ),
    (
        "bob",
        "bobtoken00000000000000000000000000000000000000000000000000000003",
    ),
    (
        "carol",
        "caroltoken000000000000000000000000000000000000000000000000000004",
    ),
];

// ============================================================================
// Test Media
// ============================================================================

pub const ANIME: &str = "Anime";
pub const MANGA: &str = "Manga";

/// An anime every fixture user may track
pub const SHARED_ANIME_ID: usize = 1001;

// ============================================================================
// Server Settings
// ============================================================================

/// Page size the test server uses when a request doesn't ask for one
pub const TEST_DEFAULT_PAGE_LIMIT: usize = 10;

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for the server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per-request timeout of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
