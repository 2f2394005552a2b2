//! Game-event descriptors and the per-connection event catalog.
//!
//! The event stream is self-describing in two phases. The first time the
//! peer sends a given event type it transmits a *descriptor* — the event's
//! name and ordered key list — marked by `event_id == 0`:
//!
//! ```text
//! i32 0 │ i32 id │ name NUL │ { u8 flag≠0 │ key NUL │ i32 type }* │ u8 0
//! ```
//!
//! Thereafter it sends *occurrences* keyed by the nonzero id, decoded by
//! replaying the cached descriptor field by field:
//!
//! ```text
//! i32 id │ f32 client_time │ value₀ │ value₁ │ …
//! ```
//!
//! The catalog is connection-scoped state: it is owned by one connection's
//! decode loop and dropped on disconnect, so descriptors never survive a
//! reconnect and must be renegotiated.

use std::collections::HashMap;

use crate::value::decode_value;
use crate::{Cursor, ProtocolError};

/// Enrichment metadata keyed by event name, then key name.
///
/// Consulted — never decoded — by this layer: a matching entry is attached
/// to the descriptor for downstream use and has no effect on decoding.
pub type EnrichmentMap = HashMap<String, HashMap<String, Vec<String>>>;

/// One key in an event descriptor: a name and its raw wire type.
///
/// The type is kept as the raw `i32` on purpose. Registration accepts any
/// tag value; only decoding an occurrence maps it through
/// [`crate::TypeTag::from_wire`] and may fail with `UnknownKeyType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventKey {
    /// Field name, unique within the descriptor.
    pub name: String,
    /// Raw type tag as transmitted.
    pub wire_type: i32,
}

/// One event type's identity and ordered field layout.
///
/// Created once per distinct id when its descriptor frame arrives,
/// immutable thereafter, owned by the [`EventCatalog`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDescriptor {
    /// Numeric id occurrences are keyed by.
    pub id: i32,
    /// Event name, e.g. `player_death`.
    pub name: String,
    /// Keys in declared order — the only correlation to occurrence values.
    pub keys: Vec<EventKey>,
    /// Attached enrichment metadata (key name → enrichment kinds).
    pub enrichments: HashMap<String, Vec<String>>,
}

impl EventDescriptor {
    /// Parses a descriptor body (everything after the `event_id == 0`
    /// marker).
    ///
    /// The key list ends at a zero flag byte or at the end of the stream;
    /// both are legitimate terminators.
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, ProtocolError> {
        let id = cursor.read_i32_le()?;
        let name = cursor.read_cstr()?;

        let mut keys = Vec::new();
        loop {
            if cursor.is_empty() {
                break;
            }
            if cursor.read_u8()? == 0 {
                break;
            }
            let key_name = cursor.read_cstr()?;
            let wire_type = cursor.read_i32_le()?;
            keys.push(EventKey {
                name: key_name,
                wire_type,
            });
        }

        Ok(Self {
            id,
            name,
            keys,
            enrichments: HashMap::new(),
        })
    }

    /// Decodes one occurrence body against this descriptor.
    ///
    /// Reads the client time, then one value per key strictly in declared
    /// order. Fails as a whole — no partial occurrence is produced — but a
    /// failure only drops this frame; the descriptor stays valid.
    pub fn decode_occurrence(
        &self,
        cursor: &mut Cursor<'_>,
    ) -> Result<GameEventOccurrence, ProtocolError> {
        let client_time = cursor.read_f32_le()?;

        let mut keys = HashMap::with_capacity(self.keys.len());
        for key in &self.keys {
            let value = decode_value(key.wire_type, cursor)?;
            keys.insert(key.name.clone(), value);
        }

        Ok(GameEventOccurrence {
            name: self.name.clone(),
            client_time,
            keys,
        })
    }
}

/// One decoded game-event occurrence.
///
/// Every value is in its canonical string form regardless of wire type —
/// a protocol-level normalization, not a limitation.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEventOccurrence {
    /// Name from the descriptor; empty if the id was never registered.
    pub name: String,
    /// Peer-side timestamp of the occurrence.
    pub client_time: f32,
    /// Decoded values by key name.
    pub keys: HashMap<String, String>,
}

/// The stateful id → descriptor mapping for one connection.
#[derive(Debug, Default)]
pub struct EventCatalog {
    known: HashMap<i32, EventDescriptor>,
    enrichments: EnrichmentMap,
}

impl EventCatalog {
    /// Creates an empty catalog with no enrichment metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty catalog that attaches entries from `enrichments`
    /// to descriptors as they register.
    pub fn with_enrichments(enrichments: EnrichmentMap) -> Self {
        Self {
            known: HashMap::new(),
            enrichments,
        }
    }

    /// Decodes one `gameEvent` payload, registering a descriptor first if
    /// the frame carries one.
    ///
    /// Descriptor frames (`event_id == 0`) register — overwriting any
    /// prior descriptor for the same id — and then decode the occurrence
    /// body that follows in the same frame. The registration sticks even
    /// if that occurrence body turns out malformed.
    ///
    /// Occurrences for an id that was never registered decode against a
    /// synthesized empty descriptor: no keys, no name, no error. The peer
    /// may simply have skipped renegotiation after a reconnect.
    pub fn decode_frame(
        &mut self,
        payload: &[u8],
    ) -> Result<GameEventOccurrence, ProtocolError> {
        let mut cursor = Cursor::new(payload);
        let event_id = cursor.read_i32_le()?;

        if event_id == 0 {
            let mut descriptor = EventDescriptor::parse(&mut cursor)?;
            if let Some(extra) = self.enrichments.get(&descriptor.name) {
                descriptor.enrichments = extra.clone();
            }
            let occurrence = descriptor.decode_occurrence(&mut cursor);
            self.known.insert(descriptor.id, descriptor);
            occurrence
        } else {
            match self.known.get(&event_id) {
                Some(descriptor) => descriptor.decode_occurrence(&mut cursor),
                None => {
                    EventDescriptor::default().decode_occurrence(&mut cursor)
                }
            }
        }
    }

    /// Looks up a registered descriptor by id.
    pub fn get(&self, id: i32) -> Option<&EventDescriptor> {
        self.known.get(&id)
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Returns `true` if no descriptor has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
