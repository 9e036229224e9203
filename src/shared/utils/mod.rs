use chrono::{Local, NaiveDate};

pub mod date_format;

/// 日付文字列を暦日として解析する
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # 戻り値
/// 実在する日付の場合はSome、形式不正・存在しない日付の場合はNone
pub fn parse_calendar_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();

    // 基本的な形式チェック（chronoはゼロ埋めなしの月日も受け付けるため）
    if date_str.len() != 10 {
        return None;
    }
    if (date_str.chars().nth(4) != Some('-')) || (date_str.chars().nth(7) != Some('-')) {
        return None;
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// 金額文字列を解析する
///
/// # 戻り値
/// 有限の数値として解析できた場合はSome
pub fn parse_amount(amount_str: &str) -> Option<f64> {
    amount_str
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// 文字数が上限以内かどうか
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数（バイト数ではなく文字数）
pub fn is_within_length(text: &str, max_length: usize) -> bool {
    text.chars().count() <= max_length
}

/// 必須フィールドが入力されているかどうか（空白のみは未入力扱い）
pub fn is_present(text: &str) -> bool {
    !text.trim().is_empty()
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 任意入力の文字列を正規化する（空白のみの場合はNone）
pub fn normalize_optional(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// カンマ区切りのタグ入力をタグ一覧に変換する
///
/// 前後の空白を除去し、空要素と重複を取り除く（出現順は維持）
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// 今日の日付を取得（ローカルタイムゾーン基準）
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 金額を文字列形式でフォーマット
///
/// 小数点以下2桁で表示する
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}
