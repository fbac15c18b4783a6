//! 注入器
//!
//! 将语言文档合并回实时数据库。紧凑记录按稠密下标对齐（跳过 null 槽位），
//! 文本段按锚点定位后拆分写回。所有异常都在单条记录 / 单个文本段的粒度上
//! 吸收，不会阻止文档其余部分的应用；同一文档重复注入结果不变。

use thiserror::Error;

use crate::database::{map_key, EventCommand, EventPage, GameDatabase, GameMap, Troop};
use crate::document::{CompactRecord, LanguageDocument, MapRecord, TroopRecord};
use crate::text_run::{split_run, Anchor, SplitError, SplitOutcome, TextRun};

/// 注入过程中被吸收的异常
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("no document stored for language '{0}'")]
    MissingDocument(String),

    #[error("{scope}: record #{position} has no usable fields")]
    MalformedRecord { scope: String, position: usize },

    #[error("{scope}: text run at {anchor} is malformed")]
    MalformedRun { scope: String, anchor: Anchor },

    #[error("{scope}: text run #{position} could not be read")]
    UnreadableRun { scope: String, position: usize },

    #[error("{scope}: anchor {anchor} no longer resolves to a live command")]
    AnchorOutOfBounds { scope: String, anchor: Anchor },

    #[error("{scope}: run at {anchor} declares {declared} lines but only {available} are live")]
    EncodingMismatch {
        scope: String,
        anchor: Anchor,
        declared: usize,
        available: usize,
    },

    #[error("{scope}: record #{position} has no matching live entity")]
    SurplusRecord { scope: String, position: usize },
}

/// 注入结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// 写入的实体字段数
    pub fields_written: usize,
    /// 写入的事件指令数
    pub commands_written: usize,
    pub anomalies: Vec<Anomaly>,
}

impl InjectionReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub(crate) fn absorb(&mut self, anomaly: Anomaly) {
        tracing::warn!("{}", anomaly);
        self.anomalies.push(anomaly);
    }

    fn merge(&mut self, other: InjectionReport) {
        self.fields_written += other.fields_written;
        self.commands_written += other.commands_written;
        self.anomalies.extend(other.anomalies);
    }
}

/// 注入整个文档（包括数据库中已加载的所有地图）
pub fn inject(document: &LanguageDocument, database: &mut GameDatabase) -> InjectionReport {
    let mut report = InjectionReport::default();

    if document.system.malformed {
        report.absorb(Anomaly::MalformedRecord { scope: "system".into(), position: 0 });
    } else {
        report.fields_written += document.system.overlay(&mut database.system);
    }

    overlay_records("actors", &document.actors, &mut database.actors, &mut report);
    overlay_records("armors", &document.armors, &mut database.armors, &mut report);
    overlay_records("classes", &document.classes, &mut database.classes, &mut report);
    overlay_records("enemies", &document.enemies, &mut database.enemies, &mut report);
    overlay_records("items", &document.items, &mut database.items, &mut report);
    overlay_records("skills", &document.skills, &mut database.skills, &mut report);
    overlay_records("states", &document.states, &mut database.states, &mut report);
    overlay_records("weapons", &document.weapons, &mut database.weapons, &mut report);

    let mut common_events = database.common_events.iter_mut().flatten();
    for (position, record) in document.common_events.iter().enumerate() {
        let Some(event) = common_events.next() else {
            report.absorb(Anomaly::SurplusRecord { scope: "commonEvents".into(), position });
            continue;
        };
        if record.malformed {
            report.absorb(Anomaly::MalformedRecord { scope: "commonEvents".into(), position });
            continue;
        }
        let scope = format!("commonEvents#{}", position);
        report_unreadable_runs(&scope, &record.unreadable_runs, &mut report);
        for run in &record.runs {
            apply_run(&scope, run, &mut event.list, &mut report);
        }
    }

    let mut troops = database.troops.iter_mut().flatten();
    for (position, record) in document.troops.iter().enumerate() {
        match troops.next() {
            Some(troop) => inject_troop(position, record, troop, &mut report),
            None => report.absorb(Anomaly::SurplusRecord { scope: "troops".into(), position }),
        }
    }

    for (map_id, map) in database.maps.iter_mut() {
        report.merge(inject_map(document, *map_id, map));
    }

    tracing::info!(
        "Injected document: {} fields, {} commands, {} anomalies",
        report.fields_written,
        report.commands_written,
        report.anomalies.len()
    );

    report
}

/// 注入单张地图（地图加载时调用）
///
/// 文档中没有该地图时不做任何修改。
pub fn inject_map(document: &LanguageDocument, map_id: u32, map: &mut GameMap) -> InjectionReport {
    let mut report = InjectionReport::default();
    let key = map_key(map_id);

    if let Some(record) = document.maps.get(&key) {
        inject_map_record(&key, record, map, &mut report);
    } else {
        tracing::debug!("No text for {} in document", key);
    }

    report
}

fn inject_map_record(scope: &str, record: &MapRecord, map: &mut GameMap, report: &mut InjectionReport) {
    if record.malformed {
        report.absorb(Anomaly::MalformedRecord { scope: scope.to_string(), position: 0 });
        return;
    }
    report_unreadable_runs(scope, &record.unreadable_runs, report);

    if let Some(display_name) = &record.display_name {
        map.display_name.clone_from(display_name);
        report.fields_written += 1;
    }

    for run in &record.runs {
        let page = map
            .events
            .get_mut(run.anchor.container as usize)
            .and_then(Option::as_mut)
            .and_then(|event| page_mut(&mut event.pages, run.anchor.page));

        match page {
            Some(page) => apply_run(scope, run, &mut page.list, report),
            None => report.absorb(Anomaly::AnchorOutOfBounds { scope: scope.to_string(), anchor: run.anchor }),
        }
    }
}

fn inject_troop(position: usize, record: &TroopRecord, troop: &mut Troop, report: &mut InjectionReport) {
    if record.malformed {
        report.absorb(Anomaly::MalformedRecord { scope: "troops".into(), position });
        return;
    }
    let scope = format!("troops#{}", position);
    report_unreadable_runs(&scope, &record.unreadable_runs, report);

    if let Some(name) = &record.base.name {
        troop.name.clone_from(name);
        report.fields_written += 1;
    }

    for run in &record.runs {
        match page_mut(&mut troop.pages, run.anchor.page) {
            Some(page) => apply_run(&scope, run, &mut page.list, report),
            None => report.absorb(Anomaly::AnchorOutOfBounds { scope: scope.clone(), anchor: run.anchor }),
        }
    }
}

fn report_unreadable_runs(scope: &str, positions: &[usize], report: &mut InjectionReport) {
    for &position in positions {
        report.absorb(Anomaly::UnreadableRun { scope: scope.to_string(), position });
    }
}

fn page_mut(pages: &mut [Option<EventPage>], page: usize) -> Option<&mut EventPage> {
    pages.get_mut(page).and_then(Option::as_mut)
}

/// 按稠密下标合并紧凑记录
///
/// 第 n 条记录写到第 n 个非 null 实体上，null 槽位永远不会被触碰。
pub fn overlay_records<R: CompactRecord>(
    scope: &str,
    records: &[R],
    live: &mut [Option<R::Entity>],
    report: &mut InjectionReport,
) {
    let mut entities = live.iter_mut().flatten();

    for (position, record) in records.iter().enumerate() {
        let Some(entity) = entities.next() else {
            report.absorb(Anomaly::SurplusRecord { scope: scope.to_string(), position });
            continue;
        };

        if record.is_empty() {
            report.absorb(Anomaly::MalformedRecord { scope: scope.to_string(), position });
            continue;
        }

        report.fields_written += record.overlay(entity);
    }
}

fn apply_run(
    scope: &str,
    run: &TextRun,
    list: &mut [Option<EventCommand>],
    report: &mut InjectionReport,
) {
    match split_run(run, list) {
        Ok(SplitOutcome { written, clipped_to, .. }) => {
            report.commands_written += written;
            if let (Some(available), Some(declared)) = (clipped_to, run.run_length) {
                report.absorb(Anomaly::EncodingMismatch {
                    scope: scope.to_string(),
                    anchor: run.anchor,
                    declared,
                    available,
                });
            }
        }
        Err(SplitError::AnchorOutOfBounds(anchor)) => {
            report.absorb(Anomaly::AnchorOutOfBounds { scope: scope.to_string(), anchor });
        }
        Err(SplitError::MalformedText(anchor)) => {
            report.absorb(Anomaly::MalformedRun { scope: scope.to_string(), anchor });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{CommonEvent, NamedEntity};
    use crate::document::NamedRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn class(name: &str) -> Option<NamedEntity> {
        Some(NamedEntity { name: name.into(), ..NamedEntity::default() })
    }

    fn names(live: &[Option<NamedEntity>]) -> Vec<Option<&str>> {
        live.iter().map(|slot| slot.as_ref().map(|c| c.name.as_str())).collect()
    }

    #[test]
    fn test_dense_index_alignment() {
        let mut live = vec![None, class("A"), None, class("B")];
        let records = vec![NamedRecord::new("A'"), NamedRecord::new("B'")];
        let mut report = InjectionReport::default();

        overlay_records("classes", &records, &mut live, &mut report);

        assert_eq!(names(&live), vec![None, Some("A'"), None, Some("B'")]);
        assert_eq!(report.fields_written, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn test_surplus_and_malformed_records() {
        let mut live = vec![None, class("A")];
        let records = vec![NamedRecord::default(), NamedRecord::new("extra")];
        let mut report = InjectionReport::default();

        overlay_records("classes", &records, &mut live, &mut report);

        assert_eq!(names(&live), vec![None, Some("A")]);
        assert_eq!(
            report.anomalies,
            vec![
                Anomaly::MalformedRecord { scope: "classes".into(), position: 0 },
                Anomaly::SurplusRecord { scope: "classes".into(), position: 1 },
            ]
        );
    }

    #[test]
    fn test_common_event_runs() {
        let mut database = GameDatabase {
            common_events: vec![
                None,
                Some(CommonEvent {
                    id: 1,
                    list: vec![
                        Some(EventCommand::text_line("Good")),
                        Some(EventCommand::text_line("morning")),
                        Some(EventCommand::new(0, 0, vec![])),
                    ],
                    ..CommonEvent::default()
                }),
            ],
            ..GameDatabase::default()
        };

        let mut document = LanguageDocument::default();
        document.common_events.push(crate::document::CommonEventRecord {
            runs: vec![
                TextRun {
                    anchor: Anchor::new(1, 0, 0),
                    parameters: vec![json!("Bon\nmatin")],
                    run_length: Some(2),
                },
                TextRun {
                    anchor: Anchor::new(1, 0, 40),
                    parameters: vec![json!("gone")],
                    run_length: Some(1),
                },
            ],
            ..Default::default()
        });

        let report = inject(&document, &mut database);
        let list = &database.common_events[1].as_ref().unwrap().list;
        assert_eq!(list[0].as_ref().unwrap().text(), Some("Bon"));
        assert_eq!(list[1].as_ref().unwrap().text(), Some("matin"));
        assert_eq!(report.commands_written, 2);
        assert_eq!(
            report.anomalies,
            vec![Anomaly::AnchorOutOfBounds { scope: "commonEvents#0".into(), anchor: Anchor::new(1, 0, 40) }]
        );
    }

    #[test]
    fn test_unreadable_entries_are_reported() {
        let mut database = GameDatabase {
            common_events: vec![
                None,
                Some(CommonEvent { id: 1, list: vec![Some(EventCommand::text_line("Hi"))], ..CommonEvent::default() }),
                Some(CommonEvent { id: 2, ..CommonEvent::default() }),
            ],
            troops: vec![None, Some(Troop { id: 1, name: "Bats".into(), ..Troop::default() })],
            ..GameDatabase::default()
        };
        let document = LanguageDocument::from_bytes(
            br#"{
                "system": "broken",
                "commonEvents": [
                    {"runs": [
                        {"anchor": "bad"},
                        {"anchor": {"container": 1, "page": 0, "index": 0}, "parameters": ["Salut"], "runLength": 1}
                    ]},
                    17
                ],
                "troops": [{"n": "Chauves-souris", "runs": [{"parameters": []}]}]
            }"#,
        )
        .unwrap();

        let report = inject(&document, &mut database);

        assert_eq!(
            report.anomalies,
            vec![
                Anomaly::MalformedRecord { scope: "system".into(), position: 0 },
                Anomaly::UnreadableRun { scope: "commonEvents#0".into(), position: 0 },
                Anomaly::MalformedRecord { scope: "commonEvents".into(), position: 1 },
                Anomaly::UnreadableRun { scope: "troops#0".into(), position: 0 },
            ]
        );
        let list = &database.common_events[1].as_ref().unwrap().list;
        assert_eq!(list[0].as_ref().unwrap().text(), Some("Salut"));
        assert_eq!(database.troops[1].as_ref().unwrap().name, "Chauves-souris");
    }

    #[test]
    fn test_malformed_map_record_leaves_map_untouched() {
        let document = LanguageDocument::from_bytes(br#"{"maps": {"MAP003": ["not", "a", "map"]}}"#).unwrap();
        let mut map = GameMap { display_name: "Cave".into(), ..GameMap::default() };
        let report = inject_map(&document, 3, &mut map);
        assert_eq!(map.display_name, "Cave");
        assert_eq!(report.anomalies, vec![Anomaly::MalformedRecord { scope: "MAP003".into(), position: 0 }]);
    }

    #[test]
    fn test_map_not_in_document_is_untouched() {
        let document = LanguageDocument::default();
        let mut map = GameMap { display_name: "Cave".into(), ..GameMap::default() };
        let report = inject_map(&document, 3, &mut map);
        assert_eq!(map.display_name, "Cave");
        assert_eq!(report, InjectionReport::default());
    }
}
