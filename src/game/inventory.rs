//! Session inventory of reward item keys.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemStack {
    pub key: String,
    pub quantity: u32,
}

/// Multiset of item keys. Listing order is insertion order; a key disappears
/// once its count reaches zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one of `key`, creating the slot if needed. Returns the new count.
    pub fn add(&mut self, key: &str) -> u32 {
        if let Some(stack) = self.stacks.iter_mut().find(|s| s.key == key) {
            stack.quantity += 1;
            return stack.quantity;
        }
        self.stacks.push(ItemStack {
            key: key.to_string(),
            quantity: 1,
        });
        1
    }

    /// Consume one of `key`. Returns false when none is held.
    pub fn use_item(&mut self, key: &str) -> bool {
        let Some(index) = self.stacks.iter().position(|s| s.key == key) else {
            return false;
        };
        let stack = &mut self.stacks[index];
        stack.quantity -= 1;
        if stack.quantity == 0 {
            self.stacks.remove(index);
        }
        true
    }

    /// Drop the whole slot for `key`. Returns the count that was held.
    pub fn remove(&mut self, key: &str) -> u32 {
        match self.stacks.iter().position(|s| s.key == key) {
            Some(index) => self.stacks.remove(index).quantity,
            None => 0,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.count(key) > 0
    }

    pub fn count(&self, key: &str) -> u32 {
        self.stacks
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    pub fn keys(&self) -> Vec<String> {
        self.stacks.iter().map(|s| s.key.clone()).collect()
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}

/// Compact listing, one line per key.
pub fn format_inventory_compact(inventory: &Inventory) -> Vec<String> {
    if inventory.is_empty() {
        return vec!["Empty".to_string()];
    }
    let mut lines: Vec<String> = inventory
        .stacks()
        .iter()
        .enumerate()
        .map(|(idx, stack)| {
            if stack.quantity > 1 {
                format!("{}. {}x {}", idx + 1, stack.quantity, stack.key)
            } else {
                format!("{}. {}", idx + 1, stack.key)
            }
        })
        .collect();
    lines.push(format!("Total: {} item types", inventory.stacks().len()));
    lines
}
