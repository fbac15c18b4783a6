//! 紧凑记录
//!
//! 每种实体只投影出可翻译字段，并使用短键名以减小语言文件体积：
//!
//! | 键   | 字段        |
//! |------|-------------|
//! | `n`  | name        |
//! | `d`  | description |
//! | `nk` | nickname    |
//! | `p`  | profile     |
//! | `m1`…`m4` | message1…message4 |
//!
//! 记录是有损视图：只能合并到已有的实体上，不能还原出完整实体。
//! 缺失的字段（`None`）在注入时保持实体原值不变。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::{Actor, DescribedEntity, NamedEntity, Skill, State, System, Terms};
use crate::text_run::TextRun;
use super::lenient::{self, Recover};

/// 实体与紧凑记录之间的映射
pub trait CompactRecord: Sized {
    type Entity;

    /// 从实体中提取可翻译字段
    fn capture(entity: &Self::Entity) -> Self;

    /// 将记录合并到实体上，返回写入的字段数
    fn overlay(&self, entity: &mut Self::Entity) -> usize;

    /// 记录中没有任何可用字段
    fn is_empty(&self) -> bool;
}

/// 有值才写入
fn merge_field(target: &mut String, value: &Option<String>) -> usize {
    match value {
        Some(text) => {
            target.clone_from(text);
            1
        }
        None => 0,
    }
}

/// 按位置写入，`None` 槽位和超出实时列表长度的部分忽略
fn merge_list(target: &mut [String], values: &Option<Vec<Option<String>>>) -> usize {
    let Some(values) = values else { return 0 };
    let mut written = 0;
    for (slot, value) in target.iter_mut().zip(values) {
        if let Some(value) = value {
            slot.clone_from(value);
            written += 1;
        }
    }
    written
}

fn slots(values: &[String]) -> Vec<Option<String>> {
    values.iter().cloned().map(Some).collect()
}

/// 名称
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRecord {
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NamedRecord {
    pub fn new(name: &str) -> Self {
        Self { name: Some(name.to_string()) }
    }

    fn merge_into(&self, name: &mut String) -> usize {
        merge_field(name, &self.name)
    }
}

impl Recover for NamedRecord {}

impl CompactRecord for NamedRecord {
    type Entity = NamedEntity;

    fn capture(entity: &NamedEntity) -> Self {
        Self::new(&entity.name)
    }

    fn overlay(&self, entity: &mut NamedEntity) -> usize {
        self.merge_into(&mut entity.name)
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}

/// 名称 + 描述
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribedRecord {
    #[serde(flatten)]
    pub base: NamedRecord,
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DescribedRecord {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            base: NamedRecord::new(name),
            description: Some(description.to_string()),
        }
    }

    fn merge_into(&self, name: &mut String, description: &mut String) -> usize {
        self.base.merge_into(name) + merge_field(description, &self.description)
    }
}

impl Recover for DescribedRecord {}

impl CompactRecord for DescribedRecord {
    type Entity = DescribedEntity;

    fn capture(entity: &DescribedEntity) -> Self {
        Self::new(&entity.name, &entity.description)
    }

    fn overlay(&self, entity: &mut DescribedEntity) -> usize {
        self.merge_into(&mut entity.name, &mut entity.description)
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty() && self.description.is_none()
    }
}

/// 角色
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRecord {
    #[serde(flatten)]
    pub base: NamedRecord,
    #[serde(rename = "nk", default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl Recover for ActorRecord {}

impl CompactRecord for ActorRecord {
    type Entity = Actor;

    fn capture(actor: &Actor) -> Self {
        Self {
            base: NamedRecord::new(&actor.name),
            nickname: Some(actor.nickname.clone()),
            profile: Some(actor.profile.clone()),
        }
    }

    fn overlay(&self, actor: &mut Actor) -> usize {
        self.base.merge_into(&mut actor.name)
            + merge_field(&mut actor.nickname, &self.nickname)
            + merge_field(&mut actor.profile, &self.profile)
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty() && self.nickname.is_none() && self.profile.is_none()
    }
}

/// 技能：名称、描述和两行使用消息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    #[serde(flatten)]
    pub base: DescribedRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m2: Option<String>,
}

impl Recover for SkillRecord {}

impl CompactRecord for SkillRecord {
    type Entity = Skill;

    fn capture(skill: &Skill) -> Self {
        Self {
            base: DescribedRecord::new(&skill.name, &skill.description),
            m1: Some(skill.message1.clone()),
            m2: Some(skill.message2.clone()),
        }
    }

    fn overlay(&self, skill: &mut Skill) -> usize {
        self.base.merge_into(&mut skill.name, &mut skill.description)
            + merge_field(&mut skill.message1, &self.m1)
            + merge_field(&mut skill.message2, &self.m2)
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty() && self.m1.is_none() && self.m2.is_none()
    }
}

/// 状态：名称和四条状态消息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(flatten)]
    pub base: NamedRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m4: Option<String>,
}

impl Recover for StateRecord {}

impl CompactRecord for StateRecord {
    type Entity = State;

    fn capture(state: &State) -> Self {
        Self {
            base: NamedRecord::new(&state.name),
            m1: Some(state.message1.clone()),
            m2: Some(state.message2.clone()),
            m3: Some(state.message3.clone()),
            m4: Some(state.message4.clone()),
        }
    }

    fn overlay(&self, state: &mut State) -> usize {
        self.base.merge_into(&mut state.name)
            + merge_field(&mut state.message1, &self.m1)
            + merge_field(&mut state.message2, &self.m2)
            + merge_field(&mut state.message3, &self.m3)
            + merge_field(&mut state.message4, &self.m4)
    }

    fn is_empty(&self) -> bool {
        self.base.is_empty()
            && self.m1.is_none()
            && self.m2.is_none()
            && self.m3.is_none()
            && self.m4.is_none()
    }
}

/// 敌群：名称 + 战斗事件页中的文本段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTroopRecord")]
pub struct TroopRecord {
    #[serde(flatten)]
    pub base: NamedRecord,
    pub runs: Vec<TextRun>,
    /// 无法解析而被剔除的文本段在 `runs` 中的位置
    #[serde(skip)]
    pub unreadable_runs: Vec<usize>,
    /// 整条记录无法解析
    #[serde(skip)]
    pub malformed: bool,
}

#[derive(Deserialize)]
struct RawTroopRecord {
    #[serde(flatten)]
    base: NamedRecord,
    #[serde(default, deserialize_with = "lenient::values")]
    runs: Vec<Value>,
}

impl From<RawTroopRecord> for TroopRecord {
    fn from(raw: RawTroopRecord) -> Self {
        let (runs, unreadable_runs) = lenient::runs(raw.runs);
        Self { base: raw.base, runs, unreadable_runs, malformed: false }
    }
}

impl Recover for TroopRecord {
    fn recover() -> Self {
        Self { malformed: true, ..Self::default() }
    }
}

/// 公共事件中的文本段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCommonEventRecord")]
pub struct CommonEventRecord {
    pub runs: Vec<TextRun>,
    #[serde(skip)]
    pub unreadable_runs: Vec<usize>,
    #[serde(skip)]
    pub malformed: bool,
}

#[derive(Deserialize)]
struct RawCommonEventRecord {
    #[serde(default, deserialize_with = "lenient::values")]
    runs: Vec<Value>,
}

impl From<RawCommonEventRecord> for CommonEventRecord {
    fn from(raw: RawCommonEventRecord) -> Self {
        let (runs, unreadable_runs) = lenient::runs(raw.runs);
        Self { runs, unreadable_runs, malformed: false }
    }
}

impl Recover for CommonEventRecord {
    fn recover() -> Self {
        Self { malformed: true, ..Self::default() }
    }
}

/// 地图：显示名 + 所有事件的文本段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawMapRecord")]
pub struct MapRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub runs: Vec<TextRun>,
    #[serde(skip)]
    pub unreadable_runs: Vec<usize>,
    #[serde(skip)]
    pub malformed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMapRecord {
    #[serde(default, deserialize_with = "lenient::text")]
    display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::values")]
    runs: Vec<Value>,
}

impl From<RawMapRecord> for MapRecord {
    fn from(raw: RawMapRecord) -> Self {
        let (runs, unreadable_runs) = lenient::runs(raw.runs);
        Self { display_name: raw.display_name, runs, unreadable_runs, malformed: false }
    }
}

impl Recover for MapRecord {
    fn recover() -> Self {
        Self { malformed: true, ..Self::default() }
    }
}

/// 用语
///
/// 列表按位置对应，`None` 槽位（包括手工写坏的槽位）保留原文。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermsRecord {
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub basic: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Map<String, Value>>,
}

impl CompactRecord for TermsRecord {
    type Entity = Terms;

    fn capture(terms: &Terms) -> Self {
        Self {
            basic: Some(slots(&terms.basic)),
            commands: Some(terms.commands.clone()),
            params: Some(slots(&terms.params)),
            messages: Some(terms.messages.clone()),
        }
    }

    fn overlay(&self, terms: &mut Terms) -> usize {
        let mut written = merge_list(&mut terms.basic, &self.basic)
            + merge_list(&mut terms.params, &self.params);

        if let Some(commands) = &self.commands {
            for (slot, value) in terms.commands.iter_mut().zip(commands) {
                // null 槽位是引擎保留的，不写入
                if let (Some(slot), Some(value)) = (slot.as_mut(), value) {
                    slot.clone_from(value);
                    written += 1;
                }
            }
        }

        if let Some(messages) = &self.messages {
            for (key, value) in messages {
                if value.is_string() {
                    terms.messages.insert(key.clone(), value.clone());
                    written += 1;
                }
            }
        }

        written
    }

    fn is_empty(&self) -> bool {
        self.basic.is_none() && self.commands.is_none() && self.params.is_none() && self.messages.is_none()
    }
}

/// 系统用语、游戏标题和各种类型名称
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRecord {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub game_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub currency_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<TermsRecord>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub skill_types: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub weapon_types: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub armor_types: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient::text_slots", skip_serializing_if = "Option::is_none")]
    pub equip_types: Option<Vec<Option<String>>>,
    /// 整个 system 段无法解析
    #[serde(skip)]
    pub malformed: bool,
}

impl Recover for SystemRecord {
    fn recover() -> Self {
        Self { malformed: true, ..Self::default() }
    }
}

impl CompactRecord for SystemRecord {
    type Entity = System;

    fn capture(system: &System) -> Self {
        Self {
            game_title: Some(system.game_title.clone()),
            currency_unit: Some(system.currency_unit.clone()),
            terms: Some(TermsRecord::capture(&system.terms)),
            elements: Some(slots(&system.elements)),
            skill_types: Some(slots(&system.skill_types)),
            weapon_types: Some(slots(&system.weapon_types)),
            armor_types: Some(slots(&system.armor_types)),
            equip_types: Some(slots(&system.equip_types)),
            malformed: false,
        }
    }

    fn overlay(&self, system: &mut System) -> usize {
        let terms = self
            .terms
            .as_ref()
            .map_or(0, |terms| terms.overlay(&mut system.terms));

        terms
            + merge_field(&mut system.game_title, &self.game_title)
            + merge_field(&mut system.currency_unit, &self.currency_unit)
            + merge_list(&mut system.elements, &self.elements)
            + merge_list(&mut system.skill_types, &self.skill_types)
            + merge_list(&mut system.weapon_types, &self.weapon_types)
            + merge_list(&mut system.armor_types, &self.armor_types)
            + merge_list(&mut system.equip_types, &self.equip_types)
    }

    fn is_empty(&self) -> bool {
        self.game_title.is_none()
            && self.currency_unit.is_none()
            && self.terms.is_none()
            && self.elements.is_none()
            && self.skill_types.is_none()
            && self.weapon_types.is_none()
            && self.armor_types.is_none()
            && self.equip_types.is_none()
    }
}
