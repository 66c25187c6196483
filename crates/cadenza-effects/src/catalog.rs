//! Effect listing used by `cadenza effects`.

use crate::params::FieldInfo;
use crate::{EffectDefaults, EffectKind};
use serde::Serialize;

/// One parameter as shown in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ParamInfo {
    /// Key.
    pub name: &'static str,
    /// Unit label, may be empty.
    pub unit: &'static str,
    /// Range in interval notation.
    pub range: String,
    /// Current default.
    pub default: f32,
    /// Short description.
    pub description: &'static str,
}

/// One effect as shown in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct EffectInfo {
    /// Kind.
    pub kind: EffectKind,
    /// One-line description.
    pub description: &'static str,
    /// Numeric parameters.
    pub params: Vec<ParamInfo>,
}

fn describe(kind: EffectKind, defaults: &EffectDefaults) -> EffectInfo {
    let spec = defaults.spec(kind);
    let params = spec
        .fields()
        .iter()
        .map(|field: &FieldInfo| ParamInfo {
            name: field.name,
            unit: field.unit,
            range: field.bounds.to_string(),
            default: spec.get(field.name).unwrap_or_default(),
            description: field.description,
        })
        .collect();
    EffectInfo {
        kind,
        description: kind.description(),
        params,
    }
}

/// Every effect kind with its parameters and the given defaults.
pub fn catalog(defaults: &EffectDefaults) -> Vec<EffectInfo> {
    EffectKind::ALL
        .iter()
        .map(|&kind| describe(kind, defaults))
        .collect()
}

/// Catalog entry for a single kind.
pub fn effect_info(kind: EffectKind, defaults: &EffectDefaults) -> EffectInfo {
    describe(kind, defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_kind() {
        let entries = catalog(&EffectDefaults::default());
        assert_eq!(entries.len(), EffectKind::ALL.len());
        assert!(entries.iter().all(|e| !e.params.is_empty()));
    }

    #[test]
    fn test_defaults_inside_ranges() {
        let info = effect_info(EffectKind::Compression, &EffectDefaults::default());
        let threshold = info.params.iter().find(|p| p.name == "threshold_db").unwrap();
        assert_eq!(threshold.default, -20.0);
        assert_eq!(threshold.range, "(-inf, 0)");
        assert_eq!(threshold.unit, "dB");
    }
}
