//! Harvestable resource nodes scattered on the field.
//!
//! Nodes are the manual-gathering side of the economy: each harvest click
//! credits one unit and always consumes one unit of the node, even when the
//! ledger is full and the credit is dropped. Depleted nodes are removed.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{FieldRng, Position};
use crate::resources::{Resource, ResourceLedger};

/// Unique identifier for a resource node.
pub type NodeId = u64;

/// The harvestable node kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Trees, harvested for wood.
    Tree,
    /// Stone outcrops.
    Stone,
    /// Iron deposits.
    Iron,
    /// Coal deposits.
    Coal,
    /// Oil seeps.
    Oil,
}

impl NodeKind {
    /// All node kinds.
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Tree,
        NodeKind::Stone,
        NodeKind::Iron,
        NodeKind::Coal,
        NodeKind::Oil,
    ];

    /// The resource a harvest credits.
    #[must_use]
    pub const fn resource(self) -> Resource {
        match self {
            NodeKind::Tree => Resource::Wood,
            NodeKind::Stone => Resource::Stone,
            NodeKind::Iron => Resource::Iron,
            NodeKind::Coal => Resource::Coal,
            NodeKind::Oil => Resource::Oil,
        }
    }

    /// Node kind spawned when `resource` unlocks, if any. Steel has no
    /// deposits; it is only produced by factories.
    #[must_use]
    pub const fn for_resource(resource: Resource) -> Option<NodeKind> {
        match resource {
            Resource::Wood => Some(NodeKind::Tree),
            Resource::Stone => Some(NodeKind::Stone),
            Resource::Iron => Some(NodeKind::Iron),
            Resource::Coal => Some(NodeKind::Coal),
            Resource::Oil => Some(NodeKind::Oil),
            Resource::Food | Resource::Steel => None,
        }
    }

    /// Units a freshly spawned node holds.
    #[must_use]
    pub const fn initial_amount(self) -> u32 {
        match self {
            NodeKind::Tree => 10,
            NodeKind::Stone => 8,
            NodeKind::Iron => 6,
            NodeKind::Coal => 7,
            NodeKind::Oil => 5,
        }
    }

    /// Nodes placed per spawn batch (initial field and unlock deposits).
    #[must_use]
    pub const fn deposit_count(self) -> usize {
        match self {
            NodeKind::Tree => 10,
            NodeKind::Stone => 8,
            NodeKind::Iron => 6,
            NodeKind::Coal => 7,
            NodeKind::Oil => 5,
        }
    }

    /// Accent color for renderers, as 0xRRGGBB.
    #[must_use]
    pub const fn accent(self) -> u32 {
        match self {
            NodeKind::Tree => 0x0022_8B22,
            NodeKind::Stone => 0x0080_8080,
            NodeKind::Iron => 0x00B0_B0B0,
            NodeKind::Coal => 0x0033_3333,
            NodeKind::Oil => 0x0011_1111,
        }
    }
}

/// One harvestable node on the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Field-unique identifier.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Placement on the field.
    pub position: Position,
    /// Units left before the node is removed.
    pub remaining: u32,
}

/// Result of a successful harvest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarvestOutcome {
    /// Resource harvested.
    pub resource: Resource,
    /// Amount actually credited (0 when the ledger was full).
    pub credited: u32,
    /// Where the node stands, for effects.
    pub position: Position,
    /// Accent color of the node kind, for effects.
    pub accent: u32,
    /// True if this harvest depleted the node.
    pub depleted: bool,
}

/// All nodes on the field plus the placement RNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeField {
    nodes: Vec<ResourceNode>,
    next_id: NodeId,
    rng: FieldRng,
}

impl NodeField {
    /// Create an empty field with a seeded placement RNG.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 0,
            rng: FieldRng::new(seed),
        }
    }

    /// Scatter the starting nodes: one batch of every kind.
    pub fn seed_initial_field(&mut self) {
        for kind in NodeKind::ALL {
            self.spawn_deposits(kind);
        }
    }

    /// Scatter a batch of nodes of one kind at random positions.
    pub fn spawn_deposits(&mut self, kind: NodeKind) {
        for _ in 0..kind.deposit_count() {
            let position = self.rng.next_position();
            let id = self.next_id;
            self.next_id += 1;
            self.nodes.push(ResourceNode {
                id,
                kind,
                position,
                remaining: kind.initial_amount(),
            });
        }
        tracing::debug!(kind = ?kind, count = kind.deposit_count(), "deposits spawned");
    }

    /// Number of nodes currently on the field.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no nodes remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.iter()
    }

    /// Harvest one unit from a node.
    ///
    /// The node loses one unit whether or not the ledger had headroom; a
    /// full ledger wastes the unit. There is no unlock gate: deposits of
    /// still-locked resources can be chipped at ahead of their unlock.
    /// Depleted nodes are removed from the field.
    pub fn harvest(
        &mut self,
        id: NodeId,
        ledger: &mut ResourceLedger,
    ) -> Result<HarvestOutcome> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GameError::NodeNotFound(id))?;
        let resource = self.nodes[index].kind.resource();

        let node = &mut self.nodes[index];
        let accent = node.kind.accent();
        let credited = ledger.credit(resource, 1);
        node.remaining = node.remaining.saturating_sub(1);
        let position = node.position;
        let depleted = node.remaining == 0;
        if depleted {
            self.nodes.swap_remove(index);
        }

        Ok(HarvestOutcome {
            resource,
            credited,
            position,
            accent,
            depleted,
        })
    }
}
