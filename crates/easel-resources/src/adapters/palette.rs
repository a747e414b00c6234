use std::fmt::Write as _;

use easel_config::{CodecError, Configuration};

use super::{PresetAdapter, PresetDraft};
use crate::{LoadError, Resource, ResourceType, StoragePlugin};

pub const PALETTE_ENGINE: &str = "palette";

const GPL_HEADER: &str = "GIMP Palette";
const GROUP_MARKER: &str = "# Group:";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaletteEntry {
    pub id: String,
    pub name: String,
    pub color: [u8; 3],
    pub spot: bool,
    /// Empty for the default group.
    pub group: String,
}

impl PaletteEntry {
    pub fn new(name: impl Into<String>, color: [u8; 3]) -> Self {
        Self {
            name: name.into(),
            color,
            ..Self::default()
        }
    }

    pub fn hex(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    pub name: String,
    pub columns: u32,
    pub entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Parses a GIMP `.gpl` palette. `# Group: <name>` comment lines start
    /// a new group for the entries that follow.
    pub fn parse_gpl(text: &str) -> Result<Self, String> {
        let mut lines = text.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header.trim() == GPL_HEADER => {}
            _ => return Err(format!("missing `{GPL_HEADER}` header")),
        }

        let mut palette = Palette::default();
        let mut group = String::new();
        for (index, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix(GROUP_MARKER) {
                group = name.trim().to_owned();
                continue;
            }
            if line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix("Name:") {
                palette.name = name.trim().to_owned();
                continue;
            }
            if let Some(columns) = line.strip_prefix("Columns:") {
                palette.columns = columns
                    .trim()
                    .parse()
                    .map_err(|err| format!("line {}: bad column count: {err}", index + 1))?;
                continue;
            }

            let mut fields = line.split_whitespace();
            let mut color = [0u8; 3];
            for channel in &mut color {
                let field = fields
                    .next()
                    .ok_or_else(|| format!("line {}: expected three channels", index + 1))?;
                *channel = field
                    .parse()
                    .map_err(|err| format!("line {}: bad channel `{field}`: {err}", index + 1))?;
            }
            let name = fields.collect::<Vec<_>>().join(" ");
            palette.entries.push(PaletteEntry {
                group: group.clone(),
                ..PaletteEntry::new(name, color)
            });
        }
        Ok(palette)
    }

    pub fn to_gpl(&self) -> String {
        let mut out = format!("{GPL_HEADER}\nName: {}\nColumns: {}\n#\n", self.name, self.columns);
        let mut group = "";
        for entry in &self.entries {
            if entry.group != group {
                group = entry.group.as_str();
                let _ = writeln!(out, "{GROUP_MARKER} {group}");
            }
            let [r, g, b] = entry.color;
            let _ = writeln!(out, "{r:3} {g:3} {b:3}\t{}", entry.name);
        }
        out
    }

    pub fn to_configuration(&self) -> Configuration {
        let mut cfg = Configuration::new()
            .with("name", self.name.as_str())
            .with("columns", self.columns)
            .with("count", self.entries.len() as i64);
        for (i, entry) in self.entries.iter().enumerate() {
            cfg.set(format!("entry.{i}.color"), entry.hex());
            cfg.set(format!("entry.{i}.name"), entry.name.as_str());
            cfg.set(format!("entry.{i}.id"), entry.id.as_str());
            cfg.set(format!("entry.{i}.spot"), entry.spot);
            cfg.set(format!("entry.{i}.group"), entry.group.as_str());
        }
        cfg
    }

    pub fn from_configuration(cfg: &Configuration) -> Result<Self, CodecError> {
        let count = cfg.get_i64("count")?;
        let columns = cfg.get_i64("columns")?;
        // every entry takes five properties, so `count` beyond that is missing fields
        let capacity = usize::try_from(count).unwrap_or(0).min(cfg.len() / 5);
        let mut entries = Vec::with_capacity(capacity);
        for i in 0..count {
            let key = |field: &str| format!("entry.{i}.{field}");
            let color_key = key("color");
            let color = parse_hex(cfg.get_str(&color_key)?)
                .ok_or_else(|| CodecError::Malformed(format!("{color_key} is not a #rrggbb color")))?;
            entries.push(PaletteEntry {
                id: cfg.get_str(&key("id"))?.to_owned(),
                name: cfg.get_str(&key("name"))?.to_owned(),
                color,
                spot: cfg.get_bool(&key("spot"))?,
                group: cfg.get_str(&key("group"))?.to_owned(),
            });
        }
        Ok(Self {
            name: cfg.get_str("name")?.to_owned(),
            columns: u32::try_from(columns)
                .map_err(|_| CodecError::Malformed(format!("column count {columns} out of range")))?,
            entries,
        })
    }

    /// Replaces the entry at `index`. Returns false when out of range.
    pub fn change_entry(&mut self, index: usize, entry: PaletteEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    /// Moves every entry of group `from` to `to`, returning how many moved.
    pub fn rename_group(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        for entry in self.entries.iter_mut().filter(|entry| entry.group == from) {
            entry.group = to.to_owned();
            renamed += 1;
        }
        renamed
    }

    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !groups.contains(&entry.group.as_str()) {
                groups.push(&entry.group);
            }
        }
        groups
    }
}

fn parse_hex(text: &str) -> Option<[u8; 3]> {
    let digits = text.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let bytes = hex::decode(digits).ok()?;
    Some([bytes[0], bytes[1], bytes[2]])
}

/// Loads GIMP palettes into flat palette configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteAdapter;

impl PresetAdapter for PaletteAdapter {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Palette
    }

    fn decode(
        &self,
        resource: &Resource,
        _storage: &dyn StoragePlugin,
    ) -> Result<PresetDraft, LoadError> {
        let palette = Palette::parse_gpl(resource.text()?).map_err(LoadError::Adapter)?;
        Ok(PresetDraft::new(PALETTE_ENGINE, palette.to_configuration()))
    }
}
