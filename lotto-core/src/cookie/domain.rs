//! Best-effort root-domain derivation for cookie scoping.

/// Multi-part public suffixes the derivation recognizes. Anything else is
/// assumed to be a single-label suffix. This is a heuristic, not a full
/// public-suffix-list lookup; hosts under other multi-part suffixes get too
/// narrow a scope.
const MULTI_PART_SUFFIXES: [&str; 6] = ["co.uk", "co.jp", "co.nz", "co.za", "com.au", "net.au"];

/// Registrable-domain guess for `host`.
///
/// Splits on `.` and keeps the last two labels, or three when the last two
/// form a known multi-part suffix. Single-label hosts come back unchanged.
pub fn root_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_PART_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}
