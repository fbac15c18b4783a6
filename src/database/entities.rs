//! 数据库实体
//!
//! 只声明可翻译字段，其余字段（数值、图片名、特性等）原样保存在 `extra` 中，
//! 保证加载 → 注入 → 保存后只有文本发生变化。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 只有名称可翻译的实体（职业、敌人）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 名称 + 描述（物品、武器、防具）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescribedEntity {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type Class = NamedEntity;
pub type Enemy = NamedEntity;
pub type Item = DescribedEntity;
pub type Weapon = DescribedEntity;
pub type Armor = DescribedEntity;

/// 角色
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub profile: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 技能
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 使用时的战斗消息（第一行）
    #[serde(default)]
    pub message1: String,
    /// 使用时的战斗消息（第二行）
    #[serde(default)]
    pub message2: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 状态
///
/// message1..message4 分别是：角色附加、敌人附加、持续中、解除时的消息。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message1: String,
    #[serde(default)]
    pub message2: String,
    #[serde(default)]
    pub message3: String,
    #[serde(default)]
    pub message4: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_actor_keeps_unknown_fields() {
        let raw = json!({
            "id": 1,
            "battlerName": "Actor1_1",
            "name": "Harold",
            "nickname": "",
            "profile": "A young hero.",
            "initialLevel": 1
        });

        let actor: Actor = serde_json::from_value(raw).unwrap();
        assert_eq!(actor.name, "Harold");
        assert_eq!(actor.extra.get("battlerName"), Some(&json!("Actor1_1")));
        assert_eq!(actor.extra.get("initialLevel"), Some(&json!(1)));

        let back = serde_json::to_value(&actor).unwrap();
        assert_eq!(back["battlerName"], json!("Actor1_1"));
        assert_eq!(back["profile"], json!("A young hero."));
    }

    #[test]
    fn test_missing_strings_default_to_empty() {
        let state: State = serde_json::from_value(json!({"id": 4, "name": "Poison"})).unwrap();
        assert_eq!(state.message1, "");
        assert_eq!(state.message4, "");
    }
}
