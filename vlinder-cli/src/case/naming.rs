//! Table and entity name conventions
//!
//! Tables are named after the plural of the entity they hold
//! (`key_outputs` holds `key_output` rows). Array keys are built from those
//! names, so both directions are needed.

/// Convert an entity name to its table (plural) form
pub fn pluralize(entity: &str) -> String {
    if entity.is_empty() {
        return entity.to_string();
    }

    let lower = entity.to_lowercase();

    // Words ending in 's', 'sh', 'ch', 'x' -> add 'es'
    if lower.ends_with('s') || lower.ends_with("sh") || lower.ends_with("ch") || lower.ends_with('x')
    {
        return format!("{}es", entity);
    }

    // Consonant + 'y' -> 'ies'
    if let Some(stem) = entity.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c.to_ascii_lowercase())) {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", entity)
}

/// Convert a table name to the entity (singular) form
/// e.g. "key_outputs" -> "key_output", "categories" -> "category"
pub fn singularize(table: &str) -> String {
    if let Some(stem) = table.strip_suffix("ies") {
        format!("{}y", stem)
    } else if table.ends_with("ses")
        || table.ends_with("xes")
        || table.ends_with("ches")
        || table.ends_with("shes")
    {
        table[..table.len() - 2].to_string()
    } else if let Some(stem) = table.strip_suffix('s') {
        stem.to_string()
    } else {
        table.to_string()
    }
}

/// Key of a vector built from a table column: the entity column maps to the
/// table name, every other column to `<entity>_<column>`
pub fn vector_key(table: &str, entity: &str, column: &str) -> String {
    if column == entity {
        table.to_string()
    } else {
        format!("{}_{}", entity, column)
    }
}
