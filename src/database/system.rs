//! System.json 中的可翻译部分

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 用语
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terms {
    /// 等级、HP、MP 等基础用语
    #[serde(default)]
    pub basic: Vec<String>,
    /// 菜单指令，部分槽位为 null
    #[serde(default)]
    pub commands: Vec<Option<String>>,
    /// 能力值名称
    #[serde(default)]
    pub params: Vec<String>,
    /// 战斗与菜单消息（键为消息名）
    #[serde(default)]
    pub messages: Map<String, Value>,
}

/// 系统数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    #[serde(default)]
    pub game_title: String,
    /// 货币单位
    #[serde(default)]
    pub currency_unit: String,
    #[serde(default)]
    pub terms: Terms,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub skill_types: Vec<String>,
    #[serde(default)]
    pub weapon_types: Vec<String>,
    #[serde(default)]
    pub armor_types: Vec<String>,
    #[serde(default)]
    pub equip_types: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
