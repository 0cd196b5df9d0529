//! Seed the inventory and the super admin.
//!
//! # Catalog Format
//!
//! ```yaml
//! - category: Tops
//!   type: T-shirts
//!   price: 120
//!   qty: 25
//! ```

use std::path::Path;

use tracing::info;

use stockroom_server::db::{InventoryRepository, LocalStorage};
use stockroom_server::models::Product;
use stockroom_server::models::product::default_catalog;
use stockroom_server::services::inventory::{ProductInput, validate};

use super::{CommandError, open_state};

/// Parse and validate a YAML catalog.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or a row is invalid.
pub fn parse_catalog(content: &str) -> Result<Vec<Product>, CommandError> {
    let rows: Vec<ProductInput> = serde_yaml::from_str(content)?;
    Ok(validate(rows)?)
}

/// What [`seed_inventory`] did to the stored inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded,
    Replaced,
    AlreadyPresent,
}

/// Read and validate a YAML catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid catalog.
pub async fn load_catalog(path: &Path) -> Result<Vec<Product>, CommandError> {
    info!(path = %path.display(), "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    parse_catalog(&content)
}

/// Write `products` as the inventory. Without `force` an existing inventory
/// is left alone.
///
/// # Errors
///
/// Returns an error if the inventory cannot be read or written.
pub async fn seed_inventory(
    storage: &LocalStorage,
    products: &[Product],
    force: bool,
) -> Result<SeedOutcome, CommandError> {
    let _guard = storage.write_lock().await;
    let repo = InventoryRepository::new(storage);

    if force {
        repo.save_all(products).await?;
        Ok(SeedOutcome::Replaced)
    } else if repo.initialize(products).await? {
        Ok(SeedOutcome::Seeded)
    } else {
        Ok(SeedOutcome::AlreadyPresent)
    }
}

/// Seed the inventory and ensure the super admin exists.
///
/// # Errors
///
/// Returns an error if the catalog file is invalid or storage fails.
pub async fn run(catalog: Option<&Path>, force: bool) -> Result<(), CommandError> {
    let products = match catalog {
        Some(path) => load_catalog(path).await?,
        None => default_catalog(),
    };

    let state = open_state().await?;
    match seed_inventory(state.storage(), &products, force).await? {
        SeedOutcome::Seeded => info!(products = products.len(), "Inventory seeded"),
        SeedOutcome::Replaced => info!(products = products.len(), "Inventory replaced"),
        SeedOutcome::AlreadyPresent => {
            info!("Inventory already present, use --force to replace it");
        }
    }

    state.accounts().upgrade_legacy_passwords().await?;
    match state
        .accounts()
        .ensure_super_admin(&state.config().super_admin, state.now())
        .await?
    {
        Some(account) => info!(username = %account.username, "Super admin created"),
        None => info!("Super admin already present"),
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_catalog() {
        let yaml = "
- category: Tops
  type: T-shirts
  price: 120
  qty: 25
- category: Footwear
  name: Sandals
  price: \"99.50\"
  quantity: 0
";
        let products = parse_catalog(yaml).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "T-shirts");
        assert_eq!(products[1].price, Decimal::new(9950, 2));
        assert_eq!(products[1].quantity, 0);
    }

    #[test]
    fn test_parse_catalog_rejects_duplicates() {
        let yaml = "
- { category: Tops, type: Jeans, price: 1, qty: 1 }
- { category: Bottoms, type: jeans, price: 2, qty: 2 }
";
        assert!(matches!(
            parse_catalog(yaml),
            Err(CommandError::Inventory(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_from_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.yaml");
        tokio::fs::write(
            &path,
            "- { category: Tops, type: Polo, price: 150, qty: 12 }\n\
             - { category: Footwear, type: Sandals, price: 99, qty: 0 }\n",
        )
        .await
        .unwrap();
        let storage = LocalStorage::open(dir.path().join("data")).await.unwrap();

        let catalog = load_catalog(&path).await.unwrap();
        assert_eq!(
            seed_inventory(&storage, &catalog, false).await.unwrap(),
            SeedOutcome::Seeded
        );

        // An existing inventory survives a plain reseed.
        let defaults = default_catalog();
        assert_eq!(
            seed_inventory(&storage, &defaults, false).await.unwrap(),
            SeedOutcome::AlreadyPresent
        );
        let stored = InventoryRepository::new(&storage).list_all().await.unwrap();
        let names: Vec<&str> = stored.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Polo", "Sandals"]);

        assert_eq!(
            seed_inventory(&storage, &defaults, true).await.unwrap(),
            SeedOutcome::Replaced
        );
        let stored = InventoryRepository::new(&storage).list_all().await.unwrap();
        assert_eq!(stored.len(), defaults.len());
    }

    #[tokio::test]
    async fn test_missing_catalog_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_catalog(&dir.path().join("nope.yaml")).await;
        assert!(matches!(result, Err(CommandError::Io(_))));
    }
}
