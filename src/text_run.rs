//! 文本段编解码
//!
//! 提取时把同一页上连续的「显示文字」行合并成一个多行字符串（join），
//! 方便译者整段翻译；注入时再把（可能被手工编辑过的）字符串拆回原来的
//! 指令槽位（split）。
//!
//! # 合并规则
//! - 连续的 401 行累积成一段，锚点为第一行的位置，`runLength` 为行数
//! - 102（选项）和 405（滚动文字）不参与合并，单独成段且不带 `runLength`
//! - 任何非文本指令、列表结尾或不相邻的 401 行都会结束当前段
//!
//! # 拆分规则
//! - 没有 `runLength`：参数原样写回锚点指令
//! - 有 `runLength = L`：按 `\n` 拆分，第 `p` 行写入 `锚点 + p`；
//!   空白行不写入（该槽位保留原文），`p >= L` 的行直接丢弃，
//!   永远不会写出原始范围之外的槽位

use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::command::{walk_commands, TextOpcode};
use crate::database::event::{EventCommand, CODE_TEXT_LINE};
use crate::utils::is_blank_line;

/// 合并时使用的行分隔符
pub const LINE_SEPARATOR: char = '\n';

/// 文本段锚点：第一条指令的 (容器, 页, 下标)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    /// 容器编号（地图事件编号、敌群编号或公共事件编号）
    pub container: u32,
    pub page: usize,
    pub index: usize,
}

impl Anchor {
    pub fn new(container: u32, page: usize, index: usize) -> Self {
        Self { container, page, index }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.container, self.page, self.index)
    }
}

/// 文本段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub anchor: Anchor,
    /// 合并段只有一个字符串参数；选项/滚动文字保存原始参数
    #[serde(default)]
    pub parameters: Vec<Value>,
    /// 合并的行数，缺省表示不是合并产物
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_length: Option<usize>,
}

impl TextRun {
    /// 合并产物
    pub fn joined(anchor: Anchor, lines: &[String]) -> Self {
        let separator = LINE_SEPARATOR.to_string();
        Self {
            anchor,
            parameters: vec![Value::String(lines.join(&separator))],
            run_length: Some(lines.len()),
        }
    }

    /// 原样写回的单条指令
    pub fn verbatim(anchor: Anchor, parameters: Vec<Value>) -> Self {
        Self { anchor, parameters, run_length: None }
    }

    pub fn is_joined(&self) -> bool {
        self.run_length.is_some()
    }

    /// 合并后的文本（合并段的第一个参数）
    pub fn text(&self) -> Option<&str> {
        self.parameters.first().and_then(Value::as_str)
    }
}

/// 正在累积的文本段
#[derive(Debug, Default)]
struct RunAccumulator {
    /// (第一行下标, 最后一行下标)，没有累积时为 None
    span: Option<(usize, usize)>,
    lines: Vec<String>,
}

impl RunAccumulator {
    fn accepts(&self, index: usize) -> bool {
        match self.span {
            Some((_, last)) => index == last + 1,
            None => true,
        }
    }

    fn push(&mut self, index: usize, text: &str) {
        let start = self.span.map_or(index, |(start, _)| start);
        self.span = Some((start, index));
        self.lines.push(text.to_string());
    }

    fn flush(&mut self, container: u32, page: usize, runs: &mut Vec<TextRun>) {
        if let Some((start, _)) = self.span.take() {
            let lines = std::mem::take(&mut self.lines);
            runs.push(TextRun::joined(Anchor::new(container, page, start), &lines));
        }
    }
}

/// 合并一页指令中的文本
///
/// `join_lines` 为 false 时每条 401 单独成段（`runLength` 恒为 1）。
pub fn join_page(
    container: u32,
    page: usize,
    list: &[Option<EventCommand>],
    join_lines: bool,
) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut acc = RunAccumulator::default();

    for slot in walk_commands(list) {
        match slot.opcode {
            Some(opcode) if opcode.is_joinable() => {
                let text = slot.command.text().unwrap_or_default();
                if !join_lines {
                    let anchor = Anchor::new(container, page, slot.index);
                    runs.push(TextRun::joined(anchor, &[text.to_string()]));
                    continue;
                }
                // 中间隔着 null 槽位的行不能算作同一段，否则拆分时会错位
                if !acc.accepts(slot.index) {
                    acc.flush(container, page, &mut runs);
                }
                acc.push(slot.index, text);
            }
            Some(_) => {
                acc.flush(container, page, &mut runs);
                let anchor = Anchor::new(container, page, slot.index);
                runs.push(TextRun::verbatim(anchor, slot.command.parameters.clone()));
            }
            None => acc.flush(container, page, &mut runs),
        }
    }
    acc.flush(container, page, &mut runs);

    runs
}

/// 拆分失败（整段跳过，不影响其它段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("anchor {0} does not resolve to a live text command")]
    AnchorOutOfBounds(Anchor),

    #[error("text run at {0} has a non-string parameter")]
    MalformedText(Anchor),
}

/// 拆分结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    /// 实际写入的指令数
    pub written: usize,
    /// 因空白行而保留原文的槽位数
    pub kept: usize,
    /// 被丢弃的行数（超出原始范围）
    pub dropped: usize,
    /// 实际可写槽位少于 `runLength` 时的可写数量
    pub clipped_to: Option<usize>,
}

/// 将文本段写回指令列表
pub fn split_run(run: &TextRun, list: &mut [Option<EventCommand>]) -> Result<SplitOutcome, SplitError> {
    let anchor = run.anchor;

    let Some(run_length) = run.run_length else {
        return write_verbatim(run, list);
    };

    let joined = match run.parameters.first() {
        None => "",
        Some(Value::String(text)) => text.as_str(),
        Some(_) => return Err(SplitError::MalformedText(anchor)),
    };

    if run_length == 0 || joined.is_empty() {
        return Ok(SplitOutcome::default());
    }

    let span = live_span(list, anchor.index, run_length);
    if span == 0 {
        return Err(SplitError::AnchorOutOfBounds(anchor));
    }

    let mut outcome = SplitOutcome {
        clipped_to: (span < run_length).then_some(span),
        ..SplitOutcome::default()
    };

    for (position, line) in joined.split(LINE_SEPARATOR).enumerate() {
        if position >= run_length {
            if !is_blank_line(line) {
                outcome.dropped += 1;
            }
            continue;
        }
        if is_blank_line(line) {
            outcome.kept += 1;
            continue;
        }
        if position >= span {
            outcome.dropped += 1;
            continue;
        }
        if let Some(command) = list[anchor.index + position].as_mut() {
            command.set_text(line);
            outcome.written += 1;
        }
    }

    tracing::trace!(
        "split run at {}: written={}, kept={}, dropped={}",
        anchor,
        outcome.written,
        outcome.kept,
        outcome.dropped
    );

    Ok(outcome)
}

/// 原样写回选项或滚动文字
///
/// 锚点处必须仍是不可合并的文本指令，空参数视为写坏的段。
fn write_verbatim(run: &TextRun, list: &mut [Option<EventCommand>]) -> Result<SplitOutcome, SplitError> {
    let anchor = run.anchor;
    if run.parameters.is_empty() {
        return Err(SplitError::MalformedText(anchor));
    }

    let command = list
        .get_mut(anchor.index)
        .and_then(Option::as_mut)
        .filter(|command| TextOpcode::from_code(command.code).is_some_and(|opcode| !opcode.is_joinable()))
        .ok_or(SplitError::AnchorOutOfBounds(anchor))?;

    command.parameters = run.parameters.clone();
    Ok(SplitOutcome { written: 1, ..SplitOutcome::default() })
}

/// 从 `start` 开始连续的 401 指令数量（最多 `limit` 条）
fn live_span(list: &[Option<EventCommand>], start: usize, limit: usize) -> usize {
    list.iter()
        .skip(start)
        .take(limit)
        .take_while(|slot| matches!(slot, Some(command) if command.code == CODE_TEXT_LINE))
        .count()
}
