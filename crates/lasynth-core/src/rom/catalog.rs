//! The ordered set of known synthesizer models

use std::collections::HashSet;
use std::path::Path;

use super::file::*;
use super::model::{Model, RomSet};
use crate::engine::SynthEngine;
use crate::error::ModelError;

/// Catalog order is selection priority: automatic resolution takes the first
/// model that can be loaded, so CM-32L variants come before MT-32 ones and
/// newer revisions before older
#[derive(Debug)]
pub struct ModelCatalog {
    models: Vec<Model>,
}

impl ModelCatalog {
    /// Build a catalog from models in priority order
    pub fn new(models: Vec<Model>) -> Result<Self, ModelError> {
        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.name()) {
                return Err(ModelError::DuplicateName(model.name().to_string()));
            }
        }
        Ok(Self { models })
    }

    /// The built-in Roland LA models
    pub fn standard() -> Self {
        let mt32_pcm = RomSet::full_or_pair(MT32_PCM_FULL, MT32_PCM_LOW, MT32_PCM_HIGH);
        let cm32l_pcm = RomSet::full_or_pair(CM32L_PCM, CM32L_PCM_LOW, CM32L_PCM_HIGH);

        let models = vec![
            Model::new_unchecked("cm32l", RomSet::full(CM32L_PCM), RomSet::full(CM32L_CONTROL)),
            Model::new_unchecked("cm32l_1_02", cm32l_pcm, RomSet::full(CM32L_CTRL_1_02)),
            Model::new_unchecked("cm32l_1_00", cm32l_pcm, RomSet::full(CM32L_CTRL_1_00)),
            Model::new_unchecked("mt32", RomSet::full(MT32_PCM), RomSet::full(MT32_CONTROL)),
            Model::new_unchecked("mt32_2_04", mt32_pcm, RomSet::pair(MT32_CTRL_2_04_A, MT32_CTRL_2_04_B)),
            Model::new_unchecked("mt32_bluer", mt32_pcm, RomSet::pair(MT32_CTRL_BLUER_A, MT32_CTRL_BLUER_B)),
            Model::new_unchecked("mt32_1_07", mt32_pcm, RomSet::pair(MT32_CTRL_1_07_A, MT32_CTRL_1_07_B)),
            Model::new_unchecked("mt32_1_06", mt32_pcm, RomSet::pair(MT32_CTRL_1_06_A, MT32_CTRL_1_06_B)),
            Model::new_unchecked("mt32_1_05", mt32_pcm, RomSet::pair(MT32_CTRL_1_05_A, MT32_CTRL_1_05_B)),
            Model::new_unchecked("mt32_1_04", mt32_pcm, RomSet::pair(MT32_CTRL_1_04_A, MT32_CTRL_1_04_B)),
        ];
        Self { models }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Model> {
        self.models.iter_mut()
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.name() == name)
    }

    /// Model names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(Model::name).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Names of the models whose ROMs validate in `dir`, in priority order
    pub fn models_in_dir<E: SynthEngine + ?Sized>(&mut self, engine: &E, dir: &Path) -> Vec<String> {
        self.models
            .iter_mut()
            .filter_map(|m| m.in_dir(engine, dir).then(|| m.name().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_standard_catalog_order() {
        let catalog = ModelCatalog::standard();
        assert_eq!(
            catalog.names(),
            vec![
                "cm32l",
                "cm32l_1_02",
                "cm32l_1_00",
                "mt32",
                "mt32_2_04",
                "mt32_bluer",
                "mt32_1_07",
                "mt32_1_06",
                "mt32_1_05",
                "mt32_1_04",
            ]
        );
    }

    #[test]
    fn test_standard_models_are_well_formed() {
        let catalog = ModelCatalog::standard();
        let rebuilt: Vec<Model> = catalog
            .iter()
            .map(|m| Model::new(m.name(), *m.pcm(), *m.control()).unwrap())
            .collect();
        assert_eq!(ModelCatalog::new(rebuilt).unwrap().len(), 10);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let model = || Model::new("x", RomSet::full(MT32_PCM), RomSet::full(MT32_CONTROL)).unwrap();
        let err = ModelCatalog::new(vec![model(), model()]).unwrap_err();
        assert_eq!(err, ModelError::DuplicateName("x".to_string()));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut catalog = ModelCatalog::standard();
        assert_eq!(catalog.get("mt32_bluer").unwrap().version(), "bluer");
        assert!(catalog.get("mt32_9_99").is_none());
        assert!(catalog.get_mut("cm32l").is_some());
    }

    #[test]
    fn test_models_in_dir() {
        let dir = TempDir::new().unwrap();
        for rom in [MT32_PCM_FULL, MT32_CTRL_1_07_A, MT32_CTRL_1_07_B] {
            fs::write(rom.path_in(dir.path()), rom.id).unwrap();
        }
        let engine = MockEngine::new();
        let mut catalog = ModelCatalog::standard();
        assert_eq!(catalog.models_in_dir(&engine, dir.path()), vec!["mt32_1_07"]);
    }
}
