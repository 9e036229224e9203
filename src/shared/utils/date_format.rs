//! 経費日付のシリアライズ形式
//!
//! APIサーバーは日付を`YYYY-MM-DD`またはRFC3339のタイムスタンプ
//! （例: `2024-03-01T00:00:00.000Z`）で返すため、どちらも日付部分だけを読み取る。
//! 送信時は常に`YYYY-MM-DD`で書き出す。

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%d";

pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format(FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_wire_date(&raw).ok_or_else(|| de::Error::custom(format!("不正な日付形式です: {raw}")))
}

/// 日付文字列の先頭10文字を日付として解析する
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, FORMAT).ok()
}
