use clubnight_domain::ID;

/// Calendar invites for a few events went out carrying the id of a
/// duplicate row that was later merged away. Replies still arrive
/// addressed to the dead id; redirecting them here keeps those members'
/// RSVPs landing on the surviving event instead of bouncing with a 404.
///
/// Consulted once, after parsing and before lookup. Keep this table flat
/// and reviewable; do not fold it into the parser.
const LEGACY_EVENT_REDIRECTS: &[(i64, i64)] = &[
    // 2023-11 double poll close created twins; 41 survived
    (42, 41),
    // Manual re-create after an edit bug; invites for 57 were already out
    (57, 58),
];

pub fn redirect_event_id(event_id: ID) -> ID {
    LEGACY_EVENT_REDIRECTS
        .iter()
        .find(|(from, _)| *from == event_id.inner())
        .map(|(_, to)| ID::new(*to))
        .unwrap_or(event_id)
}
