use tabled::Table;

use crate::{
    management::RulesManager,
    types::RuleTableRow,
    utils, warning,
};

/// Prints the configured rule specs as a table: one row per target
/// playlist with its bounds and genre lists.
pub async fn rules() {
    let manager = match RulesManager::load().await {
        Ok(manager) => manager,
        Err(_) => {
            warning!("No rules.json found, showing the built-in default rules.");
            RulesManager::defaults()
        }
    };

    let rows: Vec<RuleTableRow> = manager
        .specs()
        .iter()
        .map(|spec| RuleTableRow {
            playlist: spec.name.clone(),
            bounds: spec.describe_bounds(),
            genres: utils::format_genres(&spec.genres, 4),
            not_genres: utils::format_genres(&spec.not_genres, 4),
        })
        .collect();

    println!("{}", Table::new(rows));
}
