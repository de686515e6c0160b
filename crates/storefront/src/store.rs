//! The cart store: the one owner of the live cart.
//!
//! Views never touch the cart directly. They read snapshots through
//! [`CartStore::cart`] and send [`CartCommand`]s to [`CartStore::dispatch`],
//! which derives the next cart from the latest snapshot, swaps it in, and
//! writes the full serialized cart to storage.

use medina_core::cart::STORAGE_KEY;
use medina_core::{Cart, OptionsPatch, Product, ProductId};
use tracing::{debug, warn};

use crate::error::add_breadcrumb;
use crate::storage::CartStorage;

/// A cart change requested by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Add {
        product: Product,
        size: Option<String>,
        color: Option<String>,
    },
    UpdateQuantity {
        id: ProductId,
        quantity: i64,
        size: Option<String>,
        color: Option<String>,
    },
    Remove {
        id: ProductId,
        size: Option<String>,
        color: Option<String>,
    },
    UpdateOptions {
        id: ProductId,
        patch: OptionsPatch,
    },
    /// Fold another cart (e.g. one restored elsewhere) into this one.
    Merge(Cart),
    Clear,
}

impl CartCommand {
    const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::Remove { .. } => "remove",
            Self::UpdateOptions { .. } => "update_options",
            Self::Merge(_) => "merge",
            Self::Clear => "clear",
        }
    }

    fn apply(&self, cart: &Cart) -> Cart {
        match self {
            Self::Add {
                product,
                size,
                color,
            } => cart.add_item(product, size.as_deref(), color.as_deref()),
            Self::UpdateQuantity {
                id,
                quantity,
                size,
                color,
            } => cart.update_quantity(*id, *quantity, size.as_deref(), color.as_deref()),
            Self::Remove { id, size, color } => {
                cart.remove_item(*id, size.as_deref(), color.as_deref())
            }
            Self::UpdateOptions { id, patch } => cart.update_item_options(*id, patch),
            Self::Merge(other) => cart.merge(other),
            Self::Clear => cart.clear(),
        }
    }
}

/// Owner of the live cart and its storage backend.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
}

impl<S: CartStorage> CartStore<S> {
    /// Restore the cart from storage.
    ///
    /// A missing record gives an empty cart. An unreadable or corrupt record
    /// is logged and also gives an empty cart.
    pub fn open(storage: S) -> Self {
        let cart = match storage.load(STORAGE_KEY) {
            Ok(Some(raw)) => Cart::deserialize(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored cart is unreadable, starting empty");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart, starting empty");
                Cart::new()
            }
        };
        debug!(lines = cart.len(), "Cart restored");
        Self { storage, cart }
    }

    /// Latest cart snapshot.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply a command to the latest cart and persist the result.
    ///
    /// Persistence failures are logged; the in-memory cart still changes.
    pub fn dispatch(&mut self, command: &CartCommand) -> &Cart {
        let next = command.apply(&self.cart);
        let changed = next != self.cart;
        self.cart = next;

        let lines = self.cart.len().to_string();
        add_breadcrumb("cart", command.name(), Some(&[("lines", lines.as_str())]));
        if changed {
            self.persist();
        }
        &self.cart
    }

    fn persist(&self) {
        let result = self
            .cart
            .serialize()
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.storage
                    .save(STORAGE_KEY, &raw)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            warn!(%error, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use medina_core::{OptionUpdate, Price, ProductType};

    use super::*;
    use crate::storage::{MemoryCartStorage, StorageError};

    fn tee() -> Product {
        Product::new(
            ProductId::new(1),
            "Atlas Tee",
            Price::parse("120").unwrap(),
            ProductType::Tshirt,
        )
        .with_sizes("S,M,L")
    }

    fn add(size: &str) -> CartCommand {
        CartCommand::Add {
            product: tee(),
            size: Some(size.to_owned()),
            color: None,
        }
    }

    #[test]
    fn test_dispatch_persists_every_change() {
        let storage = Arc::new(MemoryCartStorage::new());
        let mut store = CartStore::open(Arc::clone(&storage));
        assert!(store.cart().is_empty());

        store.dispatch(&add("M"));
        store.dispatch(&add("M"));
        assert_eq!(store.cart().lines()[0].quantity(), 2);

        let saved = storage.load(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(Cart::deserialize(&saved).unwrap(), *store.cart());

        let reopened = CartStore::open(Arc::clone(&storage));
        assert_eq!(reopened.cart(), store.cart());
    }

    #[test]
    fn test_commands_apply_to_latest_snapshot() {
        let mut store = CartStore::open(MemoryCartStorage::new());
        store.dispatch(&add("S"));
        store.dispatch(&add("L"));
        store.dispatch(&CartCommand::UpdateQuantity {
            id: ProductId::new(1),
            quantity: 0,
            size: Some("S".into()),
            color: None,
        });
        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().lines()[0].selected_size(), Some("L"));

        store.dispatch(&CartCommand::UpdateOptions {
            id: ProductId::new(1),
            patch: OptionsPatch::size(OptionUpdate::set("M")),
        });
        assert_eq!(store.cart().lines()[0].selected_size(), Some("M"));

        store.dispatch(&CartCommand::Clear);
        assert!(store.cart().is_empty());
        assert_eq!(
            store.storage().load(STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_corrupt_record_opens_empty() {
        let store = CartStore::open(MemoryCartStorage::with_record(STORAGE_KEY, "{not json"));
        assert!(store.cart().is_empty());
    }

    struct BrokenStorage;

    impl CartStorage for BrokenStorage {
        fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::InvalidKey(key.to_owned()))
        }

        fn save(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_owned()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_storage_failures_are_not_fatal() {
        let mut store = CartStore::open(BrokenStorage);
        assert!(store.cart().is_empty());
        store.dispatch(&add("M"));
        assert_eq!(store.cart().len(), 1);
    }
}
