use anyhow::Result;
use std::fmt::Write as _;

use crate::database_ops::products::ProductRepository;
use crate::util::{db::connect_products, env as env_util};

#[derive(Debug, Clone, Default)]
pub struct DbCountsConfig {
    /// Optional override for the connection string.
    pub database_url: Option<String>,
}

pub async fn run(cfg: DbCountsConfig) -> Result<String> {
    env_util::init_env();
    let db_url = env_util::db_url(cfg.database_url.as_deref());
    env_util::log_config_snapshot("db-counts", &[("DATABASE_URL", db_url.clone())]);
    let repo = connect_products(&db_url).await?;
    let out = render(repo.as_ref()).await?;
    println!("{}", out);
    Ok(out)
}

/// Plain-text summary of Product rows, total then per category.
pub async fn render(repo: &dyn ProductRepository) -> Result<String> {
    let total = repo.count().await?;
    let per_category = repo.category_counts().await?;
    let mut out = String::new();
    writeln!(out, "DB COUNTS SUMMARY:").ok();
    writeln!(out, "Product: {total}").ok();
    for (category, n) in per_category {
        writeln!(out, "  {category}: {n}").ok();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::products::memory_products;
    use crate::models::Product;

    #[tokio::test]
    async fn renders_totals_and_categories() {
        let repo = memory_products().await;
        repo.upsert(&[
            Product::new("1", "A", "Shooter"),
            Product::new("2", "B", "Shooter"),
            Product::new("3", "C", "Unknown"),
        ])
        .await
        .expect("upsert");
        let out = render(&repo).await.expect("render");
        assert_eq!(
            out,
            "DB COUNTS SUMMARY:\nProduct: 3\n  Shooter: 2\n  Unknown: 1\n"
        );
    }
}
