//! 指令遍历
//!
//! 按顺序遍历一页指令列表，跳过 null 槽位，并识别三种文本指令。

use crate::database::event::{
    EventCommand, CODE_SCROLLING_TEXT, CODE_SHOW_CHOICES, CODE_TEXT_LINE,
};

/// 文本指令种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOpcode {
    /// 401 显示文字的一行，可与相邻行合并
    TextLine,
    /// 102 显示选项
    Choices,
    /// 405 滚动文字的一行
    ScrollingText,
}

impl TextOpcode {
    /// 从指令代码识别，非文本指令返回 None
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            CODE_TEXT_LINE => Some(TextOpcode::TextLine),
            CODE_SHOW_CHOICES => Some(TextOpcode::Choices),
            CODE_SCROLLING_TEXT => Some(TextOpcode::ScrollingText),
            _ => None,
        }
    }

    /// 只有普通文字行参与合并
    pub fn is_joinable(self) -> bool {
        self == TextOpcode::TextLine
    }
}

/// 遍历得到的一个非空槽位
#[derive(Debug, Clone, Copy)]
pub struct CommandSlot<'a> {
    /// 页内下标
    pub index: usize,
    /// 文本指令种类，非文本指令为 None
    pub opcode: Option<TextOpcode>,
    pub command: &'a EventCommand,
}

impl CommandSlot<'_> {
    pub fn is_text(&self) -> bool {
        self.opcode.is_some()
    }
}

/// 按列表顺序遍历所有非空指令
///
/// 非文本指令同样会产出（opcode 为 None），调用方据此结束正在累积的文本段。
pub fn walk_commands(list: &[Option<EventCommand>]) -> impl Iterator<Item = CommandSlot<'_>> {
    list.iter().enumerate().filter_map(|(index, slot)| {
        slot.as_ref().map(|command| CommandSlot {
            index,
            opcode: TextOpcode::from_code(command.code),
            command,
        })
    })
}

/// 只保留文本指令
pub fn text_commands(list: &[Option<EventCommand>]) -> impl Iterator<Item = CommandSlot<'_>> {
    walk_commands(list).filter(|slot| slot.is_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_list() -> Vec<Option<EventCommand>> {
        vec![
            Some(EventCommand::new(101, 0, vec![json!(""), json!(0), json!(0), json!(2)])),
            Some(EventCommand::text_line("Hello")),
            None,
            Some(EventCommand::new(102, 0, vec![json!(["Yes", "No"]), json!(1)])),
            Some(EventCommand::new(405, 0, vec![json!("Credits")])),
            Some(EventCommand::new(0, 0, vec![])),
        ]
    }

    #[test]
    fn test_from_code() {
        assert_eq!(TextOpcode::from_code(401), Some(TextOpcode::TextLine));
        assert_eq!(TextOpcode::from_code(102), Some(TextOpcode::Choices));
        assert_eq!(TextOpcode::from_code(405), Some(TextOpcode::ScrollingText));
        assert_eq!(TextOpcode::from_code(101), None);
        assert_eq!(TextOpcode::from_code(402), None);
        assert!(TextOpcode::TextLine.is_joinable());
        assert!(!TextOpcode::Choices.is_joinable());
    }

    #[test]
    fn test_walk_skips_null_slots() {
        let list = sample_list();
        let indices: Vec<usize> = walk_commands(&list).map(|slot| slot.index).collect();
        assert_eq!(indices, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_text_commands_keep_positions() {
        let list = sample_list();
        let slots: Vec<(usize, TextOpcode)> = text_commands(&list)
            .map(|slot| (slot.index, slot.opcode.unwrap()))
            .collect();
        assert_eq!(
            slots,
            vec![
                (1, TextOpcode::TextLine),
                (3, TextOpcode::Choices),
                (4, TextOpcode::ScrollingText),
            ]
        );
    }
}
