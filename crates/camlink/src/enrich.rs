//! Enrichment tables: per-event, per-key metadata requested from the peer.
//!
//! Enrichments do not participate in decoding at all. They are names of
//! extra context the capture tool can attach to event keys on its side
//! (e.g. resolving a `userid` to a Steam id or an eye position). The
//! table is consulted twice: once during the handshake, where each entry
//! becomes a `mirv_pgl events enrich eventProperty ...` configuration
//! command, and once per descriptor registration, where matching entries
//! are attached to the descriptor as metadata.

use std::collections::HashMap;

use camlink_protocol::EnrichmentMap;
use serde::{Deserialize, Serialize};

/// Mapping of event name → key name → enrichment kinds.
///
/// Serializes as plain nested JSON objects, so a table can be shipped as
/// a config file:
///
/// ```json
/// { "player_death": { "attacker": ["useridWithSteamId"] } }
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EnrichmentTable {
    events: EnrichmentMap,
}

impl EnrichmentTable {
    /// Creates an empty table — no enrichment commands, no attachment.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table: Steam ids and eye transforms for the common
    /// kill and damage events.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for key in ["userid", "attacker", "assister"] {
            table.add("player_death", key, "useridWithSteamId");
            table.add("player_death", key, "useridWithEyePosition");
            table.add("player_death", key, "useridWithEyeAngles");
        }
        for key in ["userid", "attacker"] {
            table.add("player_hurt", key, "useridWithSteamId");
        }
        table.add("weapon_fire", "userid", "useridWithSteamId");
        table.add("weapon_fire", "userid", "useridWithEyePosition");
        table.add("weapon_fire", "userid", "useridWithEyeAngles");
        table
    }

    /// Parses a table from a JSON document.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// Adds one enrichment kind for `key` of `event`.
    pub fn add(&mut self, event: &str, key: &str, kind: &str) {
        self.events
            .entry(event.to_string())
            .or_insert_with(HashMap::new)
            .entry(key.to_string())
            .or_insert_with(Vec::new)
            .push(kind.to_string());
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// A copy of the underlying map, in the shape the event catalog
    /// consumes.
    pub fn to_map(&self) -> EnrichmentMap {
        self.events.clone()
    }

    /// The `eventProperty` configuration commands for the handshake
    /// batch, in a deterministic (sorted) order.
    pub fn handshake_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();
        for (event, keys) in &self.events {
            for (key, kinds) in keys {
                for kind in kinds {
                    commands.push(format!(
                        r#"mirv_pgl events enrich eventProperty "{kind}" "{event}" "{key}""#
                    ));
                }
            }
        }
        commands.sort();
        commands
    }
}

// =========================================================================
// Tests
// =========================================================================
