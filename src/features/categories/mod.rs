// カテゴリ・支払い方法モジュール

pub mod models;

pub use models::{Category, PaymentMethod, UnknownVariant};
