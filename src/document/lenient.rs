//! 宽松反序列化
//!
//! 语言文件是手工编辑的，单条记录写坏不应导致整份文档作废：
//! - 紧凑记录写坏时替换为 [`Recover::recover`] 的占位记录（保持位置对齐，注入时原值不变）
//! - 文本段写坏时从列表中剔除，只记下它在 `runs` 中的位置
//! - 字符串字段或列表槽位类型不对时视为缺失，该字段 / 槽位保留原文

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::text_run::TextRun;

/// 整条记录无法解析时的占位记录
pub trait Recover: Default {
    fn recover() -> Self {
        Self::default()
    }
}

fn parse_or_recover<R: DeserializeOwned + Recover>(value: Value, what: &str) -> R {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Malformed {}: {}", what, e);
        R::recover()
    })
}

pub(crate) fn values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(values) => Ok(values),
        Value::Null => Ok(Vec::new()),
        other => {
            tracing::warn!("Expected a list, found {}", other);
            Ok(Vec::new())
        }
    }
}

pub(crate) fn record<'de, D, R>(deserializer: D) -> Result<R, D::Error>
where
    D: Deserializer<'de>,
    R: DeserializeOwned + Recover,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(R::default());
    }
    Ok(parse_or_recover(value, "section"))
}

pub(crate) fn records<'de, D, R>(deserializer: D) -> Result<Vec<R>, D::Error>
where
    D: Deserializer<'de>,
    R: DeserializeOwned + Recover,
{
    let records = values(deserializer)?
        .into_iter()
        .enumerate()
        .map(|(position, value)| parse_or_recover(value, &format!("record at position {}", position)))
        .collect();
    Ok(records)
}

pub(crate) fn maps<'de, D, R>(deserializer: D) -> Result<BTreeMap<String, R>, D::Error>
where
    D: Deserializer<'de>,
    R: DeserializeOwned + Recover,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            tracing::warn!("Expected an object of maps, found {}", other);
            return Ok(BTreeMap::new());
        }
    };

    Ok(entries
        .into_iter()
        .map(|(key, value)| {
            let record = parse_or_recover(value, &key);
            (key, record)
        })
        .collect())
}

/// 解析文本段列表，返回可用的段和无法解析的段在列表中的位置
pub(crate) fn runs(values: Vec<Value>) -> (Vec<TextRun>, Vec<usize>) {
    let mut runs = Vec::with_capacity(values.len());
    let mut unreadable = Vec::new();

    for (position, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<TextRun>(value) {
            Ok(run) => runs.push(run),
            Err(e) => {
                tracing::warn!("Dropping malformed text run #{}: {}", position, e);
                unreadable.push(position);
            }
        }
    }

    (runs, unreadable)
}

fn as_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Null => None,
        other => {
            tracing::warn!("Expected text, found {}", other);
            None
        }
    }
}

/// 可选字符串字段，类型不对时视为缺失
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(as_text(Value::deserialize(deserializer)?))
}

/// 按位置对应的字符串列表，不是字符串的槽位视为缺失
pub(crate) fn text_slots<'de, D>(deserializer: D) -> Result<Option<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(values) => Ok(Some(values.into_iter().map(as_text).collect())),
        Value::Null => Ok(None),
        other => {
            tracing::warn!("Expected a list of text, found {}", other);
            Ok(None)
        }
    }
}
