// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based model storage.
//!
//! Every placement, node and representation context gets a type-safe key
//! created by `slotmap::SlotMap`. Relationships store keys, never references,
//! so the graph has a single owner and no reference cycles.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a local placement (coordinate frame relative to a parent).
    pub struct PlacementKey;

    /// Key for a rooted entity: project, spatial structure, or element.
    pub struct NodeKey;

    /// Key for a geometric representation context or subcontext.
    pub struct ContextKey;
}
