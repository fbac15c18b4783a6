//! 游戏数据库（宿主的实时数据图）
//!
//! 对应 MV 工程 `data/` 目录下的 JSON 文件。集合沿用引擎的约定：
//! 下标 0 保留为 `null`，实体从下标 1 开始。

pub mod entities;
pub mod event;
pub mod system;

use std::collections::BTreeMap;
use std::path::Path;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::utils::{decode_text, LocalizerError};
pub use entities::{Actor, Armor, Class, DescribedEntity, Enemy, Item, NamedEntity, Skill, State, Weapon};
pub use event::{CommandList, CommonEvent, EventCommand, EventPage, GameMap, MapEvent, Troop};
pub use system::{System, Terms};

/// 带保留空槽的实体集合
pub type Collection<T> = Vec<Option<T>>;

pub const ACTORS_FILE: &str = "Actors.json";
pub const ARMORS_FILE: &str = "Armors.json";
pub const CLASSES_FILE: &str = "Classes.json";
pub const COMMON_EVENTS_FILE: &str = "CommonEvents.json";
pub const ENEMIES_FILE: &str = "Enemies.json";
pub const ITEMS_FILE: &str = "Items.json";
pub const SKILLS_FILE: &str = "Skills.json";
pub const STATES_FILE: &str = "States.json";
pub const SYSTEM_FILE: &str = "System.json";
pub const TROOPS_FILE: &str = "Troops.json";
pub const WEAPONS_FILE: &str = "Weapons.json";

/// 地图文件名，如 `Map001.json`
pub fn map_file_name(map_id: u32) -> String {
    format!("Map{:03}.json", map_id)
}

/// 语言文档中地图的键，如 `MAP001`
pub fn map_key(map_id: u32) -> String {
    format!("MAP{:03}", map_id)
}

/// 从文件名解析地图编号（`MapInfos.json` 等不匹配）
pub fn parse_map_file_name(file_name: &str) -> Option<u32> {
    let digits = file_name.strip_prefix("Map")?.strip_suffix(".json")?;
    if digits.len() < 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// 游戏数据库
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDatabase {
    pub actors: Collection<Actor>,
    pub armors: Collection<Armor>,
    pub classes: Collection<Class>,
    pub common_events: Collection<CommonEvent>,
    pub enemies: Collection<Enemy>,
    pub items: Collection<Item>,
    pub skills: Collection<Skill>,
    pub states: Collection<State>,
    pub troops: Collection<Troop>,
    pub weapons: Collection<Weapon>,
    pub system: System,
    /// 已加载的地图（按地图编号）
    pub maps: BTreeMap<u32, GameMap>,
}

impl GameDatabase {
    /// 从 `data/` 目录加载全部数据（包括所有 MapNNN.json）
    pub fn load(data_dir: &Path) -> Result<Self, LocalizerError> {
        let mut database = Self::load_without_maps(data_dir)?;

        for map_id in Self::list_map_ids(data_dir)? {
            let map = Self::load_map(data_dir, map_id)?;
            database.maps.insert(map_id, map);
        }

        tracing::info!(
            "Loaded database from {}: {} maps",
            data_dir.display(),
            database.maps.len()
        );

        Ok(database)
    }

    /// 只加载数据库文件，地图按需通过 [`GameDatabase::load_map`] 读取
    pub fn load_without_maps(data_dir: &Path) -> Result<Self, LocalizerError> {
        if !data_dir.is_dir() {
            return Err(LocalizerError::MissingDataFile(data_dir.to_path_buf()));
        }

        Ok(GameDatabase {
            actors: read_json(&data_dir.join(ACTORS_FILE))?,
            armors: read_json(&data_dir.join(ARMORS_FILE))?,
            classes: read_json(&data_dir.join(CLASSES_FILE))?,
            common_events: read_json(&data_dir.join(COMMON_EVENTS_FILE))?,
            enemies: read_json(&data_dir.join(ENEMIES_FILE))?,
            items: read_json(&data_dir.join(ITEMS_FILE))?,
            skills: read_json(&data_dir.join(SKILLS_FILE))?,
            states: read_json(&data_dir.join(STATES_FILE))?,
            troops: read_json(&data_dir.join(TROOPS_FILE))?,
            weapons: read_json(&data_dir.join(WEAPONS_FILE))?,
            system: read_json(&data_dir.join(SYSTEM_FILE))?,
            maps: BTreeMap::new(),
        })
    }

    /// 加载单张地图
    pub fn load_map(data_dir: &Path, map_id: u32) -> Result<GameMap, LocalizerError> {
        read_json(&data_dir.join(map_file_name(map_id)))
    }

    /// 列出目录中的地图编号（升序）
    pub fn list_map_ids(data_dir: &Path) -> Result<Vec<u32>, LocalizerError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let entry = entry?;
            if let Some(id) = entry.file_name().to_str().and_then(parse_map_file_name) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// 将全部数据写回目录（目录不存在时自动创建）
    pub fn save(&self, data_dir: &Path) -> Result<(), LocalizerError> {
        std::fs::create_dir_all(data_dir)?;

        write_json(&data_dir.join(ACTORS_FILE), &self.actors)?;
        write_json(&data_dir.join(ARMORS_FILE), &self.armors)?;
        write_json(&data_dir.join(CLASSES_FILE), &self.classes)?;
        write_json(&data_dir.join(COMMON_EVENTS_FILE), &self.common_events)?;
        write_json(&data_dir.join(ENEMIES_FILE), &self.enemies)?;
        write_json(&data_dir.join(ITEMS_FILE), &self.items)?;
        write_json(&data_dir.join(SKILLS_FILE), &self.skills)?;
        write_json(&data_dir.join(STATES_FILE), &self.states)?;
        write_json(&data_dir.join(TROOPS_FILE), &self.troops)?;
        write_json(&data_dir.join(WEAPONS_FILE), &self.weapons)?;
        write_json(&data_dir.join(SYSTEM_FILE), &self.system)?;

        for (map_id, map) in &self.maps {
            write_json(&data_dir.join(map_file_name(*map_id)), map)?;
        }

        tracing::info!("Saved database to {}", data_dir.display());
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LocalizerError> {
    if !path.exists() {
        return Err(LocalizerError::MissingDataFile(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_str(&decode_text(&bytes))?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LocalizerError> {
    let json = serde_json::to_string(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_file_names() {
        assert_eq!(map_file_name(1), "Map001.json");
        assert_eq!(map_file_name(123), "Map123.json");
        assert_eq!(map_key(7), "MAP007");

        assert_eq!(parse_map_file_name("Map001.json"), Some(1));
        assert_eq!(parse_map_file_name("Map1234.json"), Some(1234));
        assert_eq!(parse_map_file_name("MapInfos.json"), None);
        assert_eq!(parse_map_file_name("Map01.json"), None);
        assert_eq!(parse_map_file_name("Actors.json"), None);
    }

    #[test]
    fn test_load_missing_directory() {
        let result = GameDatabase::load(Path::new("/nonexistent/rmmv/data"));
        assert!(matches!(result, Err(LocalizerError::MissingDataFile(_))));
    }
}
