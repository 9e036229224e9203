//! クエリキャッシュ
//!
//! APIから取得したデータをクエリキー単位で短時間保持する。
//! ミューテーション成功後は影響を受けるクエリ種別を明示して`invalidate`する。
//!
//! 同一キーへの書き込みは後勝ち（last-write-wins）。
//! 取得中に別の取得やinvalidateが走った場合、最後に完了した応答が残る。
//! 読み取り中心のワークロードでは許容し、次の自動更新で収束させる。

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// キャッシュキー
///
/// 各キーは無効化の単位となる種別（`Kind`）に属する
pub trait CacheKey: Clone + Eq + Hash + Send + Sync + std::fmt::Debug {
    type Kind: Copy + Eq + Send + Sync + std::fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// キャッシュエントリ
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    /// APIから取得した時刻
    pub fetched_at: Instant,
    /// 最後に参照された時刻
    pub last_accessed: Instant,
    /// invalidate済み（次回参照時に再取得する）
    pub invalidated: bool,
}

impl<V> CacheEntry<V> {
    /// 新鮮なデータかどうか
    ///
    /// invalidateされておらず、取得からstale_time未満であれば新鮮
    pub fn is_fresh(&self, now: Instant, stale_time: Duration) -> bool {
        !self.invalidated && now.saturating_duration_since(self.fetched_at) < stale_time
    }
}

/// クエリキャッシュのインターフェース
pub trait QueryCache<K: CacheKey, V: Clone>: Send + Sync {
    /// エントリを取得する（参照時刻を更新する）
    fn get(&self, key: &K) -> Option<CacheEntry<V>>;

    /// エントリを保存する（同一キーは上書き）
    fn set(&self, key: K, value: V, fetched_at: Instant);

    /// 指定した種別のエントリをすべて無効化する
    ///
    /// # 戻り値
    /// 無効化したエントリ数
    fn invalidate(&self, kinds: &[K::Kind]) -> usize;

    /// 保持しているキーの一覧
    fn keys(&self) -> Vec<K>;

    /// max_idle以上参照されていないエントリを破棄する
    ///
    /// # 戻り値
    /// 破棄したキー
    fn evict_idle(&self, max_idle: Duration) -> Vec<K>;
}

/// メモリ上のクエリキャッシュ
pub struct InMemoryQueryCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for InMemoryQueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> InMemoryQueryCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // パニックしたスレッドがあってもキャッシュ自体は整合しているため継続する
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> QueryCache<K, V> for InMemoryQueryCache<K, V>
where
    K: CacheKey,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        let mut entries = self.lock();
        let entry = entries.get_mut(key)?;
        entry.last_accessed = Instant::now();
        Some(entry.clone())
    }

    fn set(&self, key: K, value: V, fetched_at: Instant) {
        let mut entries = self.lock();
        // 再取得では参照時刻を更新しない（自動更新だけでは破棄対象から外れない）
        let last_accessed = entries
            .get(&key)
            .map(|existing| existing.last_accessed)
            .unwrap_or(fetched_at);

        entries.insert(
            key,
            CacheEntry {
                data: value,
                fetched_at,
                last_accessed,
                invalidated: false,
            },
        );
    }

    fn invalidate(&self, kinds: &[K::Kind]) -> usize {
        let mut entries = self.lock();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if kinds.contains(&key.kind()) {
                entry.invalidated = true;
                count += 1;
            }
        }
        log::debug!("キャッシュを無効化しました: kinds={kinds:?}, count={count}");
        count
    }

    fn keys(&self) -> Vec<K> {
        self.lock().keys().cloned().collect()
    }

    fn evict_idle(&self, max_idle: Duration) -> Vec<K> {
        let now = Instant::now();
        let mut entries = self.lock();
        let idle: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.last_accessed) >= max_idle)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &idle {
            entries.remove(key);
        }
        if !idle.is_empty() {
            log::debug!("未使用のキャッシュを破棄しました: keys={idle:?}");
        }
        idle
    }
}
