//! 语言文档
//!
//! 一种语言的全部紧凑记录和文本段。文件格式为 JSON，数组位置即实体的
//! 稠密下标（跳过 null 槽位后的顺序），地图按 `MAPnnn` 键索引。
//!
//! ```json
//! {
//!   "system": { "gameTitle": "...", "terms": { ... } },
//!   "actors": [ { "n": "Harold", "nk": "", "p": "..." } ],
//!   "commonEvents": [ { "runs": [ ... ] } ],
//!   "maps": { "MAP001": { "displayName": "Town", "runs": [ ... ] } }
//! }
//! ```

mod lenient;
pub mod records;

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::utils::decode_text;
pub use records::{
    ActorRecord, CommonEventRecord, CompactRecord, DescribedRecord, MapRecord, NamedRecord,
    SkillRecord, StateRecord, SystemRecord, TermsRecord, TroopRecord,
};
use crate::text_run::TextRun;

/// 语言文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDocument {
    #[serde(default, deserialize_with = "lenient::record")]
    pub system: SystemRecord,
    #[serde(default, deserialize_with = "lenient::records")]
    pub actors: Vec<ActorRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub armors: Vec<DescribedRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub classes: Vec<NamedRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub common_events: Vec<CommonEventRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub enemies: Vec<NamedRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub items: Vec<DescribedRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub skills: Vec<SkillRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub states: Vec<StateRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub troops: Vec<TroopRecord>,
    #[serde(default, deserialize_with = "lenient::records")]
    pub weapons: Vec<DescribedRecord>,
    /// 地图键（`MAPnnn`）到地图记录
    #[serde(default, deserialize_with = "lenient::maps")]
    pub maps: BTreeMap<String, MapRecord>,
}

/// 文档统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub records: usize,
    pub maps: usize,
    pub runs: usize,
    /// 合并段中的文字行总数
    pub lines: usize,
}

impl std::fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, {} maps, {} text runs ({} dialogue lines)",
            self.records, self.maps, self.runs, self.lines
        )
    }
}

impl LanguageDocument {
    /// 从字节解析（容忍 UTF-8 BOM）
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&decode_text(bytes))
    }

    /// 序列化为便于手工编辑的缩进 JSON
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// 遍历文档中的所有文本段
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        let common = self.common_events.iter().flat_map(|event| event.runs.iter());
        let troops = self.troops.iter().flat_map(|troop| troop.runs.iter());
        let maps = self.maps.values().flat_map(|map| map.runs.iter());
        common.chain(troops).chain(maps)
    }

    pub fn stats(&self) -> DocumentStats {
        let records = self.actors.len()
            + self.armors.len()
            + self.classes.len()
            + self.enemies.len()
            + self.items.len()
            + self.skills.len()
            + self.states.len()
            + self.troops.len()
            + self.weapons.len();

        let mut stats = DocumentStats {
            records,
            maps: self.maps.len(),
            ..DocumentStats::default()
        };
        for run in self.runs() {
            stats.runs += 1;
            stats.lines += run.run_length.unwrap_or(0);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_run::Anchor;
    use pretty_assertions::assert_eq;

    fn sample() -> LanguageDocument {
        let mut document = LanguageDocument {
            actors: vec![ActorRecord {
                base: NamedRecord::new("Harold"),
                nickname: Some(String::new()),
                profile: Some("A hero.".into()),
            }],
            classes: vec![NamedRecord::new("Hero")],
            ..LanguageDocument::default()
        };
        document.maps.insert(
            "MAP001".into(),
            MapRecord {
                display_name: Some("Town".into()),
                runs: vec![TextRun::joined(Anchor::new(1, 0, 1), &["Hi".into(), "there".into()])],
                ..MapRecord::default()
            },
        );
        document
    }

    #[test]
    fn test_bytes_round_trip() {
        let document = sample();
        let bytes = document.to_bytes().unwrap();
        assert_eq!(LanguageDocument::from_bytes(&bytes).unwrap(), document);
    }

    #[test]
    fn test_parse_with_bom_and_missing_sections() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(br#"{"classes": [{"n": "Knight"}]}"#);

        let document = LanguageDocument::from_bytes(&bytes).unwrap();
        assert_eq!(document.classes, vec![NamedRecord::new("Knight")]);
        assert!(document.actors.is_empty());
        assert!(document.maps.is_empty());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        assert!(LanguageDocument::from_bytes(b"{\"actors\": [").is_err());
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.maps, 1);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.lines, 2);
    }
}
