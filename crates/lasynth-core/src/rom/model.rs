//! Synthesizer models and their ROM sets

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::file::RomFile;
use super::RomCategory;
use crate::engine::SynthEngine;
use crate::error::ModelError;

/// How one ROM category can be satisfied: a full image, a pair of partial
/// images, or either
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomSet {
    pub full: Option<RomFile>,
    pub pair: Option<(RomFile, RomFile)>,
}

impl RomSet {
    pub const fn full(rom: RomFile) -> Self {
        Self {
            full: Some(rom),
            pair: None,
        }
    }

    pub const fn pair(first: RomFile, second: RomFile) -> Self {
        Self {
            full: None,
            pair: Some((first, second)),
        }
    }

    pub const fn full_or_pair(full: RomFile, first: RomFile, second: RomFile) -> Self {
        Self {
            full: Some(full),
            pair: Some((first, second)),
        }
    }

    /// At least one way of satisfying the category exists
    pub fn is_complete(&self) -> bool {
        self.full.is_some() || self.pair.is_some()
    }
}

/// A named synthesizer configuration: one PCM set and one control set
///
/// Validation results are memoised per directory for the lifetime of the
/// model, on the assumption that ROM directories do not change while the
/// program runs. Directories are compared by path value, not by filesystem
/// identity.
#[derive(Debug)]
pub struct Model {
    name: String,
    version: String,
    pcm: RomSet,
    control: RomSet,
    in_dir: HashMap<PathBuf, bool>,
}

impl Model {
    /// Define a model; both categories must be satisfiable
    pub fn new(name: impl Into<String>, pcm: RomSet, control: RomSet) -> Result<Self, ModelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        for (category, set) in [(RomCategory::Pcm, &pcm), (RomCategory::Control, &control)] {
            if !set.is_complete() {
                return Err(ModelError::IncompleteCategory {
                    model: name,
                    category,
                });
            }
        }
        Ok(Self::new_unchecked(name, pcm, control))
    }

    /// For the built-in catalog, whose definitions are covered by tests
    pub(crate) fn new_unchecked(name: impl Into<String>, pcm: RomSet, control: RomSet) -> Self {
        let name = name.into();
        let version = match name.split_once('_') {
            Some((_, version)) => version.to_string(),
            None => name.clone(),
        };
        Self {
            name,
            version,
            pcm,
            control,
            in_dir: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without the family prefix (`mt32_1_07` → `1_07`), or the whole
    /// name when there is none
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn pcm(&self) -> &RomSet {
        &self.pcm
    }

    pub fn control(&self) -> &RomSet {
        &self.control
    }

    fn rom_set(&self, category: RomCategory) -> &RomSet {
        match category {
            RomCategory::Pcm => &self.pcm,
            RomCategory::Control => &self.control,
        }
    }

    /// Whether `dir` holds a complete, correctly identified ROM set
    ///
    /// Memoised per directory: a repeated query does not touch the engine.
    pub fn in_dir<E: SynthEngine + ?Sized>(&mut self, engine: &E, dir: &Path) -> bool {
        if let Some(&present) = self.in_dir.get(dir) {
            return present;
        }

        let present = self.has_category(engine, dir, RomCategory::Pcm)
            && self.has_category(engine, dir, RomCategory::Control);
        log::debug!(
            "Model {} {} in {}",
            self.name,
            if present { "found" } else { "not found" },
            dir.display()
        );

        self.in_dir.insert(dir.to_path_buf(), present);
        present
    }

    fn has_category<E: SynthEngine + ?Sized>(
        &self,
        engine: &E,
        dir: &Path,
        category: RomCategory,
    ) -> bool {
        let set = self.rom_set(category);
        let full = set.full.is_some_and(|rom| rom_present(engine, dir, &rom));
        full || set
            .pair
            .is_some_and(|(a, b)| rom_present(engine, dir, &a) && rom_present(engine, dir, &b))
    }

    /// Load both ROM categories from `dir` into the engine
    ///
    /// Each category is loaded from its full image if possible, otherwise by
    /// merging its pair. Fails without loading anything if the model has not
    /// validated in `dir`.
    pub fn load<E: SynthEngine + ?Sized>(&mut self, engine: &mut E, dir: &Path) -> bool {
        if !self.in_dir(engine, dir) {
            return false;
        }
        self.load_category(engine, dir, RomCategory::Pcm)
            && self.load_category(engine, dir, RomCategory::Control)
    }

    fn load_category<E: SynthEngine + ?Sized>(
        &self,
        engine: &mut E,
        dir: &Path,
        category: RomCategory,
    ) -> bool {
        let set = *self.rom_set(category);
        let expected = category.loaded_code();

        let loaded_full = set
            .full
            .is_some_and(|rom| engine.add_rom_file(&rom.path_in(dir)) == expected);
        if loaded_full {
            return true;
        }

        let loaded_pair = set.pair.is_some_and(|(a, b)| {
            engine.merge_and_add_rom_files(&a.path_in(dir), &b.path_in(dir)) == expected
        });
        if !loaded_pair {
            log::warn!(
                "Model {}: engine rejected the {} ROM in {}",
                self.name,
                category,
                dir.display()
            );
        }
        loaded_pair
    }
}

/// The file exists, the engine identifies it, and for a versioned file the
/// engine reports exactly its id
fn rom_present<E: SynthEngine + ?Sized>(engine: &E, dir: &Path, rom: &RomFile) -> bool {
    let path = rom.path_in(dir);
    if !path.exists() {
        return false;
    }
    match engine.identify_rom_file(&path) {
        Some(info) => !rom.is_versioned() || info.matches_id(rom.id),
        None => false,
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Model {}

impl PartialOrd for Model {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Model {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}
