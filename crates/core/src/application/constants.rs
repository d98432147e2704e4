// Lifecycle constants (No magic values)
use std::time::Duration;

/// Canonical liveness probe response
pub const PING_RESPONSE: &str = "PONG/2";

/// Delay between the control plane starting and the self-check request (1s)
pub const SELF_CHECK_DELAY: Duration = Duration::from_secs(1);

/// Time a spawned helper must survive to count as started (500ms)
pub const SPAWN_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Trailing characters of output logged when a helper exits abnormally
pub const EXIT_OUTPUT_TAIL_CHARS: usize = 1000;

/// SIGTERM -> SIGKILL window when stopping a helper (5 seconds)
pub const GRACEFUL_TERMINATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on joining process monitors at shutdown (5 seconds)
pub const MONITOR_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default control-plane port
pub const DEFAULT_HTTP_PORT: u16 = 8318;

/// Filter table dump issued by `clean`
pub const FILTER_TABLE_DUMP: [&str; 4] = ["iptables", "-L", "-v", "-n"];

/// NAT table dump issued by `clean`
pub const NAT_TABLE_DUMP: [&str; 6] = ["iptables", "-t", "nat", "-L", "-v", "-n"];
