//! Zone membership fingerprinting.
//!
//! A fixture is only meaningful for the zone membership it was generated
//! from. The engine stores a fingerprint of that membership on the
//! tournament and re-checks it before the bracket is built, so rebuilding
//! zones without regenerating the fixture is caught instead of silently
//! producing a bracket from stale standings.

use sha2::{Digest, Sha256};

use crate::api::Zone;

/// Compute a SHA-256 fingerprint of a zone set's membership.
///
/// The rendering is position-ordered and id-based, so the fingerprint is
/// stable across serialization details and label changes.
pub fn zone_fingerprint(zones: &[Zone]) -> String {
    let mut ordered: Vec<&Zone> = zones.iter().collect();
    ordered.sort_by_key(|z| z.position);

    let mut hasher = Sha256::new();
    for zone in ordered {
        hasher.update(zone.position.to_le_bytes());
        for team in &zone.team_ids {
            hasher.update(team.value().to_le_bytes());
        }
        hasher.update([0xff]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TeamId, TournamentId, ZoneId};

    fn zone(id: i64, position: usize, team_ids: Vec<i64>) -> Zone {
        Zone {
            id: ZoneId::new(id),
            tournament_id: TournamentId::new(1),
            label: format!("Zone {}", position),
            position,
            team_ids: team_ids.into_iter().map(TeamId::new).collect(),
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let zones = vec![zone(1, 0, vec![1, 2, 3]), zone(2, 1, vec![4, 5])];
        assert_eq!(zone_fingerprint(&zones), zone_fingerprint(&zones));
    }

    #[test]
    fn test_fingerprint_ignores_zone_order_and_labels() {
        let a = vec![zone(1, 0, vec![1, 2]), zone(2, 1, vec![3, 4])];
        let mut b = vec![zone(9, 1, vec![3, 4]), zone(8, 0, vec![1, 2])];
        b[0].label = "renamed".to_string();

        assert_eq!(zone_fingerprint(&a), zone_fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_membership() {
        let a = vec![zone(1, 0, vec![1, 2])];
        let b = vec![zone(1, 0, vec![1, 3])];
        let c = vec![zone(1, 0, vec![2, 1])];

        assert_ne!(zone_fingerprint(&a), zone_fingerprint(&b));
        // Member order matters: it is the standings input order.
        assert_ne!(zone_fingerprint(&a), zone_fingerprint(&c));
    }
}
