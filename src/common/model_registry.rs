use std::collections::BTreeMap;
use crate::common::{ModelVersion, PredsLayout};
use crate::detection_runners::Inference;
use crate::error::DetectError;
use crate::Result;

/// A loaded model plus what the decoder needs to read its output.
pub struct ModelEntry {
    session: Box<dyn Inference>,
    layout: PredsLayout,
    names: Option<Vec<String>>,
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("layout", &self.layout)
            .field("names", &self.names)
            .finish()
    }
}

impl ModelEntry {
    pub fn new(session: impl Inference + 'static, layout: PredsLayout) -> Self {
        Self {
            session: Box::new(session),
            layout,
            names: None,
        }
    }

    /// Overrides the class names reported by the session.
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn session(&self) -> &dyn Inference {
        self.session.as_ref()
    }

    pub fn layout(&self) -> PredsLayout {
        self.layout
    }

    /// Explicit names first, then whatever the model embeds.
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref().or_else(|| self.session.names())
    }
}

/// Immutable selector → model map, built once at startup and shared by
/// every request.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<ModelVersion, ModelEntry>,
}

impl ModelRegistry {
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Looks up a request selector such as `"yolo11"`.
    pub fn resolve(&self, selector: &str) -> Result<(ModelVersion, &ModelEntry)> {
        let version = ModelVersion::from_name(selector)
            .ok_or_else(|| DetectError::UnknownModel(selector.to_string()))?;
        let entry = self
            .models
            .get(&version)
            .ok_or_else(|| DetectError::UnknownModel(selector.to_string()))?;
        Ok((version, entry))
    }

    pub fn versions(&self) -> Vec<ModelVersion> {
        self.models.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistryBuilder {
    models: BTreeMap<ModelVersion, ModelEntry>,
}

impl ModelRegistryBuilder {
    pub fn with_model(mut self, version: ModelVersion, entry: ModelEntry) -> Result<Self> {
        if self.models.contains_key(&version) {
            return Err(DetectError::Config(format!("model {version} registered twice")));
        }
        self.models.insert(version, entry);
        Ok(self)
    }

    pub fn build(self) -> ModelRegistry {
        ModelRegistry { models: self.models }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::X;

    struct Echo;

    impl Inference for Echo {
        fn infer(&self, xs: &X) -> anyhow::Result<X> {
            Ok(xs.clone())
        }
    }

    #[test]
    fn resolves_registered_models_only() {
        let registry = ModelRegistry::builder()
            .with_model(ModelVersion::Yolo11, ModelEntry::new(Echo, PredsLayout::AnchorsFirst))
            .unwrap()
            .build();

        let (version, entry) = registry.resolve("YOLO11").unwrap();
        assert_eq!(version, ModelVersion::Yolo11);
        assert_eq!(entry.layout(), PredsLayout::AnchorsFirst);

        assert!(matches!(registry.resolve("yolo9"), Err(DetectError::UnknownModel(_))));
        assert!(matches!(registry.resolve("resnet"), Err(DetectError::UnknownModel(_))));
        assert_eq!(registry.versions(), vec![ModelVersion::Yolo11]);
    }

    #[test]
    fn duplicate_registration_fails() {
        let res = ModelRegistry::builder()
            .with_model(ModelVersion::Yolo9, ModelEntry::new(Echo, PredsLayout::AnchorsFirst))
            .unwrap()
            .with_model(ModelVersion::Yolo9, ModelEntry::new(Echo, PredsLayout::AnchorsLast));
        assert!(matches!(res, Err(DetectError::Config(_))));
    }

    #[test]
    fn explicit_names_win() {
        let entry = ModelEntry::new(Echo, PredsLayout::AnchorsFirst);
        assert!(entry.names().is_none());
        let entry = entry.with_names(vec!["bayam".into()]);
        assert_eq!(entry.names(), Some(&["bayam".to_string()][..]));
    }
}
