pub mod convert;
pub mod import;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use vlinder::Config;
use vlinder::case::Schema;

/// Template from the command line, else from config, else the built-in one
pub fn load_schema(template: Option<&Path>, config: &Config) -> Result<Arc<Schema>> {
    let schema = match template.or(config.template.as_deref()) {
        Some(path) => {
            log::info!("Using template {}", path.display());
            Schema::load(path)
                .with_context(|| format!("Failed to load template: {}", path.display()))?
        }
        None => Schema::builtin().context("Failed to load the built-in template")?,
    };
    Ok(Arc::new(schema))
}
