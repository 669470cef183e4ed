use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{InventoryItem, ResourceKind};

/// Price lookup for mined resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    prices: HashMap<ResourceKind, u32>,
}

impl Default for Economy {
    fn default() -> Self {
        Self::new()
            .with_price(ResourceKind::Ruby, 100)
            .with_price(ResourceKind::Emerald, 250)
            .with_price(ResourceKind::Diamond, 500)
    }
}

impl Economy {
    /// An economy where nothing has a price yet.
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
        }
    }

    pub fn with_price(mut self, kind: ResourceKind, price: u32) -> Self {
        self.prices.insert(kind, price);
        self
    }

    /// Current price of one unit of `kind`; unpriced kinds are worth nothing.
    pub fn price(&self, kind: ResourceKind) -> u32 {
        self.prices.get(&kind).copied().unwrap_or(0)
    }

    /// Combined sell price of `items`, capped at `u32::MAX`.
    pub fn inventory_value(&self, items: &[InventoryItem]) -> u32 {
        items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(self.price(item.kind)))
    }
}
