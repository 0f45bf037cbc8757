use card_scout::catalog::{CardCatalog, CardType};
use card_scout::error::AppError;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog from `path`, or the bundled sample catalog when none is configured.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<CardCatalog, AppError> {
    let catalog = match path {
        Some(path) => {
            let catalog = CardCatalog::from_path(path)?;
            info!(path = %path.display(), cards = catalog.len(), "loaded card catalog");
            catalog
        }
        None => {
            let catalog = CardCatalog::bundled()?;
            info!(cards = catalog.len(), "using bundled sample catalog");
            catalog
        }
    };
    Ok(catalog)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_card_mode(raw: &str) -> Result<CardType, String> {
    match CardType::parse(raw) {
        CardType::Unknown => Err(format!("card mode must be personal or business, got '{raw}'")),
        mode => Ok(mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date(" 2025-10-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date"))
        );
        assert!(parse_date("10/01/2025").is_err());
    }

    #[test]
    fn card_mode_rejects_unknown_values() {
        assert_eq!(parse_card_mode("Business"), Ok(CardType::Business));
        assert!(parse_card_mode("corporate").is_err());
    }

    #[test]
    fn falls_back_to_the_bundled_catalog() {
        let catalog = load_catalog(None).expect("bundled catalog loads");
        assert!(!catalog.is_empty());
    }
}
