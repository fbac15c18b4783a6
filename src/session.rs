//! 语言会话
//!
//! 持有配置的语言列表、当前选中的语言、已解析的文档缓存以及最近一次注入的语言。
//! 宿主在启动时创建一个会话，之后在切换语言和场景入口处调用 [`LanguageSession::apply`]。

use std::collections::HashMap;

use crate::config::{GenerationPolicy, LanguageConfig, LanguageEntry};
use crate::database::{GameDatabase, GameMap};
use crate::document::LanguageDocument;
use crate::extractor::{extract, ExtractOptions};
use crate::injector::{inject, inject_map, Anomaly, InjectionReport};
use crate::io::LanguageStore;
use crate::utils::LocalizerError;

/// 文档生成结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    /// 是否重新提取了默认语言文档
    pub extracted: bool,
    /// 用默认文档填充的语言
    pub seeded: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LanguageSession {
    config: LanguageConfig,
    active: usize,
    documents: HashMap<String, LanguageDocument>,
    applied: Option<String>,
}

impl LanguageSession {
    pub fn new(config: LanguageConfig) -> Self {
        Self {
            config,
            active: 0,
            documents: HashMap::new(),
            applied: None,
        }
    }

    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions { join_text_lines: self.config.join_text_lines }
    }

    /// 读取并解析所有配置语言的文档
    ///
    /// 缺失或无法解析的文档只记录日志并跳过。返回成功加载的数量。
    pub fn load_languages(&mut self, store: &impl LanguageStore) -> usize {
        let languages: Vec<String> = self.config.languages.iter().map(|entry| entry.language.clone()).collect();

        let mut loaded = 0;
        for language in languages {
            match read_document(store, &language) {
                Ok(Some(document)) => {
                    tracing::debug!("Loaded '{}': {}", language, document.stats());
                    self.documents.insert(language, document);
                    loaded += 1;
                }
                Ok(None) => tracing::warn!("No document for language '{}'", language),
                Err(e) => tracing::warn!("{}", e),
            }
        }

        tracing::info!("Loaded {}/{} language documents", loaded, self.config.languages.len());
        loaded
    }

    /// 按生成策略提取默认语言文档，并为没有文档的语言填充默认文档的副本
    pub fn generate_documents(
        &mut self,
        database: &GameDatabase,
        store: &impl LanguageStore,
    ) -> Result<Generation, LocalizerError> {
        let default_language = self.config.default_language.clone();
        let extract_now = match self.config.generation_policy {
            GenerationPolicy::Never => return Ok(Generation::default()),
            GenerationPolicy::Always => true,
            GenerationPolicy::IfMissing => !store.has_document(&default_language),
        };

        let mut generation = Generation { extracted: extract_now, ..Generation::default() };

        let default_document = if extract_now {
            if let Some(backup) = store.backup(&default_language)? {
                tracing::info!("Backed up previous '{}' document to {}", default_language, backup.display());
            }
            let document = extract(database, &self.extract_options());
            store.write(&default_language, &document.to_bytes()?)?;
            tracing::info!("Wrote {}", store.document_path(&default_language).display());
            document
        } else {
            match self.documents.get(&default_language).cloned() {
                Some(document) => document,
                None => match read_document(store, &default_language)? {
                    Some(document) => document,
                    None => return Ok(generation),
                },
            }
        };

        let bytes = default_document.to_bytes()?;
        for entry in &self.config.languages {
            if self.config.is_default(&entry.language) || store.has_document(&entry.language) {
                continue;
            }
            store.write(&entry.language, &bytes)?;
            tracing::info!("Seeded '{}' from the default document", entry.language);
            self.documents.insert(entry.language.clone(), default_document.clone());
            generation.seeded.push(entry.language.clone());
        }

        self.documents.insert(default_language, default_document);
        Ok(generation)
    }

    pub fn languages(&self) -> &[LanguageEntry] {
        &self.config.languages
    }

    pub fn active_language(&self) -> Option<&LanguageEntry> {
        self.config.languages.get(self.active)
    }

    /// 最近一次成功注入的语言
    pub fn applied_language(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    pub fn document(&self, language: &str) -> Option<&LanguageDocument> {
        self.documents.get(language)
    }

    pub fn insert_document(&mut self, language: &str, document: LanguageDocument) {
        self.documents.insert(language.to_string(), document);
    }

    /// 选中指定位置的语言，越界时返回 false 且不改变选择
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.config.languages.len() {
            return false;
        }
        self.active = index;
        true
    }

    /// 切换到下一种语言，末尾回到开头
    pub fn next_language(&mut self) -> Option<&LanguageEntry> {
        let count = self.config.languages.len();
        if count > 0 {
            self.active = (self.active + 1) % count;
        }
        self.active_language()
    }

    /// 切换到上一种语言，开头回到末尾
    pub fn previous_language(&mut self) -> Option<&LanguageEntry> {
        let count = self.config.languages.len();
        if count > 0 {
            self.active = (self.active + count - 1) % count;
        }
        self.active_language()
    }

    /// 当前选择（写入存档配置的值）
    pub fn selection(&self) -> usize {
        self.active
    }

    /// 恢复存档配置中的选择，无效值回到第一种语言
    pub fn restore_selection(&mut self, saved: Option<usize>) {
        self.active = match saved {
            Some(index) if index < self.config.languages.len() => index,
            Some(index) => {
                tracing::warn!("Saved language index {} out of range, using the first language", index);
                0
            }
            None => 0,
        };
    }

    /// 注入当前选中的语言
    ///
    /// 文档不存在时不做任何修改，之前注入的语言保持生效。
    pub fn apply(&mut self, database: &mut GameDatabase) -> InjectionReport {
        let Some(language) = self.active_language().map(|entry| entry.language.clone()) else {
            return InjectionReport::default();
        };

        let Some(document) = self.documents.get(&language) else {
            let mut report = InjectionReport::default();
            report.absorb(Anomaly::MissingDocument(language));
            return report;
        };

        let report = inject(document, database);
        self.applied = Some(language);
        report
    }

    /// 地图加载时注入已生效语言的地图文本
    pub fn apply_map(&self, map_id: u32, map: &mut GameMap) -> InjectionReport {
        match self.applied.as_ref().and_then(|language| self.documents.get(language)) {
            Some(document) => inject_map(document, map_id, map),
            None => InjectionReport::default(),
        }
    }
}

/// 读取并解析一种语言的文档，不存在时返回 None
pub fn read_document(
    store: &impl LanguageStore,
    language: &str,
) -> Result<Option<LanguageDocument>, LocalizerError> {
    let Some(bytes) = store.read(language) else {
        return Ok(None);
    };
    LanguageDocument::from_bytes(&bytes)
        .map(Some)
        .map_err(|source| LocalizerError::MalformedDocument { language: language.to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Actor, NamedEntity};
    use crate::document::{ActorRecord, NamedRecord};
    use crate::io::MemoryLanguageStore;
    use pretty_assertions::assert_eq;

    fn config(policy: GenerationPolicy) -> LanguageConfig {
        LanguageConfig {
            languages: vec![
                LanguageEntry::new("default", "English", "Language"),
                LanguageEntry::new("french", "Francais", "Langue"),
                LanguageEntry::new("german", "Deutsch", "Sprache"),
            ],
            generation_policy: policy,
            ..LanguageConfig::default()
        }
    }

    fn database() -> GameDatabase {
        GameDatabase {
            actors: vec![None, Some(Actor { name: "Harold".into(), ..Actor::default() })],
            classes: vec![None, Some(NamedEntity { name: "Hero".into(), ..NamedEntity::default() })],
            ..GameDatabase::default()
        }
    }

    fn french() -> LanguageDocument {
        LanguageDocument {
            actors: vec![ActorRecord { base: NamedRecord::new("Harald"), ..ActorRecord::default() }],
            classes: vec![NamedRecord::new("Heros")],
            ..LanguageDocument::default()
        }
    }

    fn actor_name(database: &GameDatabase) -> &str {
        &database.actors[1].as_ref().unwrap().name
    }

    #[test]
    fn test_cyclic_switching() {
        let mut session = LanguageSession::new(config(GenerationPolicy::Never));
        assert_eq!(session.previous_language().unwrap().language, "german");
        assert_eq!(session.next_language().unwrap().language, "default");
        assert_eq!(session.next_language().unwrap().language, "french");
        assert_eq!(session.selection(), 1);
        assert!(!session.select(3));
        assert!(session.select(2));
        assert_eq!(session.next_language().unwrap().language, "default");
    }

    #[test]
    fn test_restore_selection() {
        let mut session = LanguageSession::new(config(GenerationPolicy::Never));
        session.restore_selection(Some(2));
        assert_eq!(session.active_language().unwrap().language, "german");
        session.restore_selection(Some(9));
        assert_eq!(session.selection(), 0);
        session.restore_selection(None);
        assert_eq!(session.selection(), 0);
    }

    #[test]
    fn test_missing_document_keeps_previous_language() {
        let mut session = LanguageSession::new(config(GenerationPolicy::Never));
        session.insert_document("french", french());
        let mut db = database();

        session.select(1);
        assert!(session.apply(&mut db).is_clean());
        assert_eq!(actor_name(&db), "Harald");
        assert_eq!(session.applied_language(), Some("french"));

        session.select(2);
        let report = session.apply(&mut db);
        assert_eq!(report.anomalies, vec![Anomaly::MissingDocument("german".into())]);
        assert_eq!(actor_name(&db), "Harald");
        assert_eq!(session.applied_language(), Some("french"));
    }

    #[test]
    fn test_generate_if_missing_extracts_and_seeds() {
        let store = MemoryLanguageStore::new();
        store.insert("german", french().to_bytes().unwrap());
        let mut session = LanguageSession::new(config(GenerationPolicy::IfMissing));

        let generation = session.generate_documents(&database(), &store).unwrap();
        assert!(generation.extracted);
        assert_eq!(generation.seeded, vec!["french".to_string()]);

        let default = session.document("default").unwrap();
        assert_eq!(default.classes, vec![NamedRecord::new("Hero")]);
        assert_eq!(session.document("french"), Some(default));

        // 默认文档已存在，不再提取
        let mut again = LanguageSession::new(config(GenerationPolicy::IfMissing));
        let generation = again.generate_documents(&database(), &store).unwrap();
        assert_eq!(generation, Generation::default());
    }

    #[test]
    fn test_generate_always_overwrites() {
        let store = MemoryLanguageStore::new();
        store.insert("default", french().to_bytes().unwrap());
        let mut session = LanguageSession::new(config(GenerationPolicy::Always));

        let generation = session.generate_documents(&database(), &store).unwrap();
        assert!(generation.extracted);

        let stored = read_document(&store, "default").unwrap().unwrap();
        assert_eq!(stored.classes, vec![NamedRecord::new("Hero")]);
    }

    #[test]
    fn test_generate_never_does_nothing() {
        let store = MemoryLanguageStore::new();
        let mut session = LanguageSession::new(config(GenerationPolicy::Never));
        assert_eq!(session.generate_documents(&database(), &store).unwrap(), Generation::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_generate_fails_on_read_only_store() {
        let store = MemoryLanguageStore::read_only();
        let mut session = LanguageSession::new(config(GenerationPolicy::Always));
        assert!(matches!(
            session.generate_documents(&database(), &store),
            Err(LocalizerError::Store(_))
        ));
    }

    #[test]
    fn test_load_languages_skips_malformed() {
        let store = MemoryLanguageStore::new();
        store.insert("default", LanguageDocument::default().to_bytes().unwrap());
        store.insert("french", b"{ not json".to_vec());

        let mut session = LanguageSession::new(config(GenerationPolicy::Never));
        assert_eq!(session.load_languages(&store), 1);
        assert!(session.document("default").is_some());
        assert!(session.document("french").is_none());
        assert!(matches!(
            read_document(&store, "french"),
            Err(LocalizerError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_apply_map_uses_applied_language() {
        let mut document = french();
        document.maps.insert(
            "MAP002".into(),
            crate::document::MapRecord { display_name: Some("Port".into()), ..Default::default() },
        );
        let mut session = LanguageSession::new(config(GenerationPolicy::Never));
        session.insert_document("french", document);

        let mut map = GameMap { display_name: "Harbor".into(), ..GameMap::default() };
        session.apply_map(2, &mut map);
        assert_eq!(map.display_name, "Harbor");

        session.select(1);
        session.apply(&mut database());
        session.apply_map(2, &mut map);
        assert_eq!(map.display_name, "Port");
    }
}
