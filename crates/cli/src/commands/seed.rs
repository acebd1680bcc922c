//! Seed the catalog and an admin account.
//!
//! Reads a YAML file (the bundled `seed/catalog.yaml` unless `--file` is
//! given), inserts its products and creates its admin account if that email
//! is not registered yet.
//!
//! Without `--clear` products are only inserted into an empty catalog, so
//! running the seeder twice does not duplicate them.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use orchard_core::Price;
use orchard_storefront::db::{NewProduct, ProductRepository, UserRepository};
use orchard_storefront::services::auth::AuthService;

use super::connect;

/// Bundled demo catalog.
const DEFAULT_SEED: &str = include_str!("../../seed/catalog.yaml");

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub admin: SeedAdmin,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// Admin account to create.
#[derive(Debug, Deserialize)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A product entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub count_in_stock: u32,
}

impl SeedProduct {
    fn to_new_product(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            description: self.description.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            price: self.price,
            count_in_stock: self.count_in_stock,
        }
    }
}

/// Parse a seed file.
///
/// # Errors
///
/// Returns the YAML error if the file does not match the expected shape.
pub fn parse(content: &str) -> Result<SeedFile, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Seed the database.
///
/// # Arguments
///
/// * `file_path` - Seed file to load instead of the bundled catalog
/// * `clear_existing` - Delete every product before inserting
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a database
/// operation fails.
pub async fn run(file_path: Option<&str>, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }
            info!(path = %file_path, "Loading seed file");
            tokio::fs::read_to_string(path).await?
        }
        None => DEFAULT_SEED.to_string(),
    };

    // Parse before connecting so a bad file fails fast
    let seed = parse(&content)?;
    info!(products = seed.products.len(), "Parsed seed file");

    let pool = connect().await?;
    let products = ProductRepository::new(&pool);

    if clear_existing {
        let removed = products.delete_all().await?;
        info!(removed, "Cleared existing products");
    }

    if products.count().await? > 0 {
        warn!("Catalog is not empty, skipping products (use --clear to replace them)");
    } else {
        for product in &seed.products {
            let created = products
                .create(&product.to_new_product(), &product.image)
                .await?;
            info!(product_id = %created.snapshot.id, name = %created.snapshot.name, "Created product");
        }
        info!(count = seed.products.len(), "Products seeded");
    }

    let admin_email = orchard_core::Email::parse(&seed.admin.email)?;
    if UserRepository::new(&pool)
        .get_by_email(&admin_email)
        .await?
        .is_some()
    {
        info!(email = %admin_email, "Admin user already exists");
    } else {
        let admin = AuthService::new(&pool)
            .create_user(&seed.admin.name, &seed.admin.email, &seed.admin.password, true)
            .await?;
        info!(email = %admin.email, "Admin user created");
    }

    info!("Database seeded successfully!");
    Ok(())
}
