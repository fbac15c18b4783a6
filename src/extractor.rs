//! 提取器
//!
//! 遍历实时数据库，为每个可翻译实体生成紧凑记录，为每个事件页生成文本段，
//! 得到默认语言的语言文档。

use crate::database::{map_key, CommonEvent, GameDatabase, GameMap, Troop};
use crate::document::{
    CommonEventRecord, CompactRecord, LanguageDocument, MapRecord, NamedRecord, SystemRecord,
    TroopRecord,
};
use crate::text_run::join_page;

/// 提取选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// 是否合并连续的文字行
    pub join_text_lines: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { join_text_lines: true }
    }
}

/// 将集合压缩为稠密记录序列
///
/// 第 n 条记录对应第 n 个非 null 的实体，而不是实体下标。
pub fn compact<R: CompactRecord>(collection: &[Option<R::Entity>]) -> Vec<R> {
    collection.iter().flatten().map(R::capture).collect()
}

/// 提取整个数据库
pub fn extract(database: &GameDatabase, options: &ExtractOptions) -> LanguageDocument {
    let mut document = LanguageDocument {
        system: SystemRecord::capture(&database.system),
        actors: compact(&database.actors),
        armors: compact(&database.armors),
        classes: compact(&database.classes),
        enemies: compact(&database.enemies),
        items: compact(&database.items),
        skills: compact(&database.skills),
        states: compact(&database.states),
        weapons: compact(&database.weapons),
        ..LanguageDocument::default()
    };

    document.common_events = database
        .common_events
        .iter()
        .enumerate()
        .filter_map(|(index, event)| event.as_ref().map(|event| extract_common_event(index, event, options)))
        .collect();

    document.troops = database
        .troops
        .iter()
        .enumerate()
        .filter_map(|(index, troop)| troop.as_ref().map(|troop| extract_troop(index, troop, options)))
        .collect();

    for (map_id, map) in &database.maps {
        document.maps.insert(map_key(*map_id), extract_map(map, options));
    }

    tracing::info!("Extracted language document: {}", document.stats());

    document
}

/// 提取公共事件（只有一页，页号为 0）
pub fn extract_common_event(index: usize, event: &CommonEvent, options: &ExtractOptions) -> CommonEventRecord {
    CommonEventRecord {
        runs: join_page(index as u32, 0, &event.list, options.join_text_lines),
        ..CommonEventRecord::default()
    }
}

/// 提取敌群名称和战斗事件
pub fn extract_troop(index: usize, troop: &Troop, options: &ExtractOptions) -> TroopRecord {
    let runs = troop
        .pages
        .iter()
        .enumerate()
        .filter_map(|(page_index, page)| page.as_ref().map(|page| (page_index, page)))
        .flat_map(|(page_index, page)| {
            join_page(index as u32, page_index, &page.list, options.join_text_lines)
        })
        .collect();

    TroopRecord {
        base: NamedRecord::new(&troop.name),
        runs,
        ..TroopRecord::default()
    }
}

/// 提取地图显示名和所有事件页
///
/// 锚点的容器编号是事件在 `events` 数组中的下标。
pub fn extract_map(map: &GameMap, options: &ExtractOptions) -> MapRecord {
    let mut runs = Vec::new();

    for (event_index, event) in map.events.iter().enumerate() {
        let Some(event) = event else { continue };
        for (page_index, page) in event.pages.iter().enumerate() {
            let Some(page) = page else { continue };
            runs.extend(join_page(event_index as u32, page_index, &page.list, options.join_text_lines));
        }
    }

    MapRecord {
        display_name: Some(map.display_name.clone()),
        runs,
        ..MapRecord::default()
    }
}
