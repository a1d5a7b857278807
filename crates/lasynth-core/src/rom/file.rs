//! ROM file registry
//!
//! Every ROM image the catalog knows about, by engine id and file name.
//! Traditional dumps ship one file per ROM; MAME-style dumps ship the chips
//! separately, so one ROM may need two files.

use std::path::{Path, PathBuf};

/// An identified ROM image: the id the engine reports and its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RomFile {
    pub id: &'static str,
    pub filename: &'static str,
}

impl RomFile {
    pub const fn new(id: &'static str, filename: &'static str) -> Self {
        Self { id, filename }
    }

    /// Whether the id names a specific revision (`ctrl_mt32_1_07_a`) rather
    /// than just a category and family (`ctrl_mt32`)
    ///
    /// A versioned file is only accepted when the engine reports this exact id.
    pub fn is_versioned(&self) -> bool {
        self.id.find('_') != self.id.rfind('_')
    }

    /// Where this file would live inside `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.filename)
    }
}

// Traditional full dumps
pub const MT32_PCM: RomFile = RomFile::new("pcm_mt32", "MT32_PCM.ROM");
pub const MT32_CONTROL: RomFile = RomFile::new("ctrl_mt32", "MT32_CONTROL.ROM");
pub const CM32L_PCM: RomFile = RomFile::new("pcm_cm32l", "CM32L_PCM.ROM");
pub const CM32L_CONTROL: RomFile = RomFile::new("ctrl_cm32l", "CM32L_CONTROL.ROM");

// MAME dumps: MT-32 PCM, full and per chip
pub const MT32_PCM_FULL: RomFile = RomFile::new("pcm_mt32", "r15449121.ic37.bin");
pub const MT32_PCM_LOW: RomFile = RomFile::new("pcm_mt32_l", "r15179844.ic21.bin");
pub const MT32_PCM_HIGH: RomFile = RomFile::new("pcm_mt32_h", "r15179845.ic22.bin");

// MAME dumps: MT-32 control, per firmware revision
pub const MT32_CTRL_1_04_A: RomFile = RomFile::new("ctrl_mt32_1_04_a", "mt32_1.0.4.ic27.bin");
pub const MT32_CTRL_1_04_B: RomFile = RomFile::new("ctrl_mt32_1_04_b", "mt32_1.0.4.ic26.bin");
pub const MT32_CTRL_1_05_A: RomFile = RomFile::new("ctrl_mt32_1_05_a", "mt32_1.0.5.ic27.bin");
pub const MT32_CTRL_1_05_B: RomFile = RomFile::new("ctrl_mt32_1_05_b", "mt32_1.0.5.ic26.bin");
pub const MT32_CTRL_1_06_A: RomFile = RomFile::new("ctrl_mt32_1_06_a", "mt32_1.0.6.ic27.bin");
pub const MT32_CTRL_1_06_B: RomFile = RomFile::new("ctrl_mt32_1_06_b", "mt32_1.0.6.ic26.bin");
pub const MT32_CTRL_1_07_A: RomFile = RomFile::new("ctrl_mt32_1_07_a", "mt32_1.0.7.ic27.bin");
pub const MT32_CTRL_1_07_B: RomFile = RomFile::new("ctrl_mt32_1_07_b", "mt32_1.0.7.ic26.bin");
pub const MT32_CTRL_BLUER_A: RomFile = RomFile::new("ctrl_mt32_bluer_a", "blue_ridge__mt32a.bin");
pub const MT32_CTRL_BLUER_B: RomFile = RomFile::new("ctrl_mt32_bluer_b", "blue_ridge__mt32b.bin");
pub const MT32_CTRL_2_04_A: RomFile = RomFile::new("ctrl_mt32_2_04_a", "mt32_2.0.4.ic27.bin");
pub const MT32_CTRL_2_04_B: RomFile = RomFile::new("ctrl_mt32_2_04_b", "mt32_2.0.4.ic26.bin");

// MAME dumps: CM-32L PCM halves (the low half is the MT-32 PCM chip)
pub const CM32L_PCM_LOW: RomFile = RomFile::new("pcm_mt32", "r15449121.ic37.bin");
pub const CM32L_PCM_HIGH: RomFile = RomFile::new("pcm_cm32l_h", "r15179945.ic8.bin");

// MAME dumps: CM-32L control, per firmware revision
pub const CM32L_CTRL_1_00: RomFile = RomFile::new("ctrl_cm32l_1_00", "lapc-i.v1.0.0.ic3.bin");
pub const CM32L_CTRL_1_02: RomFile = RomFile::new("ctrl_cm32l_1_02", "cm32l_control.rom");
