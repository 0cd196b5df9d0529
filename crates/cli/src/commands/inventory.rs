//! Inventory inspection commands.

use tracing::info;

use stockroom_core::Price;
use stockroom_server::services::inventory::{InventoryQuery, SortKey, SortOrder};

use super::{CommandError, open_state};

/// List products with their stock status.
///
/// # Errors
///
/// Returns an error for an unknown sort key or if the catalog cannot be read.
pub async fn list(sort: Option<&str>, desc: bool, query: Option<String>) -> Result<(), CommandError> {
    let sort = sort
        .map(str::parse::<SortKey>)
        .transpose()
        .map_err(CommandError::InvalidArgument)?;
    let query = InventoryQuery {
        sort,
        order: if desc { SortOrder::Desc } else { SortOrder::Asc },
        q: query,
    };

    let state = open_state().await?;
    let products = state.inventory().list(&query).await?;

    info!("{:<12} {:<16} {:>10} {:>6}  Status", "Category", "Type", "Price", "Qty");
    for product in &products {
        info!(
            "{:<12} {:<16} {:>10} {:>6}  {}",
            product.category,
            product.name,
            Price::new(product.price, state.currency()).display_fixed(),
            product.qty,
            product.status_label
        );
    }
    info!("{} products", products.len());
    Ok(())
}
