//! Target selection for recovery
//!
//! A static preference over declared footprints. Live memory readings are
//! never consulted here.

use crate::config::{Inventory, InventoryMode};
use crate::recovery::types::{ControllerState, TriggerReason};

/// Pick the index to switch to in the active list
pub fn select_target(
    inventory: &Inventory,
    state: &ControllerState,
    reason: TriggerReason,
    prefer_lower_memory: bool,
) -> usize {
    let mode = inventory.mode();
    let len = inventory.active_len();
    if len == 0 {
        return 0;
    }
    let current = state.active_index(mode);
    let round_robin = (current + 1) % len;

    if reason != TriggerReason::MemoryOverload || !prefer_lower_memory {
        return round_robin;
    }

    let candidate = match mode {
        InventoryMode::Model => lightest(inventory, |_| true).filter(|&idx| idx != current),
        InventoryMode::Profile => inventory
            .active_ram_gb(current)
            .and_then(|current_ram| lightest(inventory, |ram| ram < current_ram)),
    };

    candidate.unwrap_or(round_robin)
}

/// Index of the smallest declared footprint accepted by `keep`; the first
/// occurrence wins ties
fn lightest(inventory: &Inventory, keep: impl Fn(f64) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for idx in 0..inventory.active_len() {
        let ram = match inventory.active_ram_gb(idx) {
            Some(ram) if keep(ram) => ram,
            _ => continue,
        };
        match best {
            Some((_, best_ram)) if best_ram <= ram => {}
            _ => best = Some((idx, ram)),
        }
    }

    best.map(|(idx, _)| idx)
}
