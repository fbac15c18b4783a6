//! 事件与事件指令
//!
//! 地图事件、公共事件和敌群事件页都由一串 [`EventCommand`] 组成，
//! 指令列表中允许出现 `null` 槽位，因此统一用 `Option` 表示。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 显示文字的一行
pub const CODE_TEXT_LINE: i32 = 401;
/// 显示选项
pub const CODE_SHOW_CHOICES: i32 = 102;
/// 滚动文字的一行
pub const CODE_SCROLLING_TEXT: i32 = 405;

/// 一条事件指令
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCommand {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub indent: i32,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl EventCommand {
    pub fn new(code: i32, indent: i32, parameters: Vec<Value>) -> Self {
        Self { code, indent, parameters }
    }

    /// 构造一行显示文字指令
    pub fn text_line(text: &str) -> Self {
        Self::new(CODE_TEXT_LINE, 0, vec![Value::String(text.to_string())])
    }

    /// 第一个参数作为文本读取
    pub fn text(&self) -> Option<&str> {
        self.parameters.first().and_then(Value::as_str)
    }

    /// 写入唯一的文本参数
    pub fn set_text(&mut self, text: &str) {
        let value = Value::String(text.to_string());
        match self.parameters.first_mut() {
            Some(slot) => *slot = value,
            None => self.parameters.push(value),
        }
    }
}

/// 指令列表（可能包含 null 槽位）
pub type CommandList = Vec<Option<EventCommand>>;

/// 事件页（地图事件页和敌群战斗事件页结构相同）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub list: CommandList,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 公共事件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonEvent {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub list: CommandList,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 敌群
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Troop {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pages: Vec<Option<EventPage>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 地图上的事件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapEvent {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pages: Vec<Option<EventPage>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 地图（MapNNN.json）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    /// 进入地图时显示的名称
    #[serde(default, rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub events: Vec<Option<MapEvent>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
