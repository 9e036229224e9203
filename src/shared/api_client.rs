/// 汎用APIクライアント
///
/// 経費APIサーバーとの通信を行う。HTTPステータスを
/// アプリケーションのエラー分類（認証切れ・未発見・一時的エラーなど）に変換する。
use crate::shared::config::environment::ApiConfig;
use crate::shared::errors::{AppError, AppResult, GENERIC_ERROR_MESSAGE};
use log::{debug, info, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// APIクライアント設定
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
        }
    }
}

impl From<ApiConfig> for ApiClientConfig {
    fn from(api_config: ApiConfig) -> Self {
        Self {
            base_url: api_config.base_url,
            timeout_seconds: api_config.timeout_seconds,
            max_retries: api_config.max_retries,
        }
    }
}

impl ApiClientConfig {
    /// 環境設定からAPIクライアント設定を作成
    pub fn from_env() -> AppResult<Self> {
        ApiConfig::from_env().map(Self::from)
    }
}

/// APIサーバーからのエラーレスポンス
///
/// `message`は任意項目。無い場合は汎用メッセージで補う。
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// サーバーのメッセージ（空白のみの場合は無しとみなす）
    pub fn server_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// 表示用メッセージ（無い場合は汎用メッセージ）
    pub fn display_message(&self) -> String {
        self.server_message()
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
    }
}

/// HTTPステータスとエラーレスポンスからエラー種別を決定する
///
/// # 分類
/// - 401/403 → 認証期限切れ
/// - 404 → 未発見
/// - 408/429/5xx → 一時的エラー
/// - その他の4xx → 拒否（サーバーのメッセージを保持）
pub fn classify_error_status(status: StatusCode, body: &ErrorResponse) -> AppError {
    match status.as_u16() {
        401 | 403 => AppError::AuthExpired(body.display_message()),
        404 => AppError::NotFound(body.display_message()),
        code if code == 408 || code == 429 || status.is_server_error() => {
            AppError::TransientFetch {
                detail: format!("status={code}"),
                server_message: body.server_message(),
            }
        }
        code => AppError::Rejected {
            status: code,
            server_message: body.server_message(),
        },
    }
}

/// リトライ間隔の上限（秒）
const MAX_RETRY_DELAY_SECONDS: u64 = 30;

/// n回目のリトライまでの待機時間（2^n秒、上限あり）
fn retry_delay(attempt: u32) -> Duration {
    Duration::from_secs(
        2_u64
            .saturating_pow(attempt)
            .min(MAX_RETRY_DELAY_SECONDS),
    )
}

/// 汎用APIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiClientConfig,
}

impl ApiClient {
    /// 環境変数の設定でAPIクライアントを作成
    pub fn new() -> AppResult<Self> {
        let config = ApiClientConfig::from_env()?;
        Self::new_with_config(config)
    }

    /// 設定を指定してAPIクライアントを作成
    pub fn new_with_config(config: ApiClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self { client, config })
    }

    /// 設定を取得
    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.base_url)
    }

    fn with_auth(request: RequestBuilder, auth_token: Option<&str>) -> RequestBuilder {
        match auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        info!("GETリクエスト送信: endpoint={endpoint}");

        let request = Self::with_auth(self.client.get(self.url(endpoint)), auth_token);
        let response = self
            .send_request_with_retry(request, Method::GET, endpoint)
            .await?;
        Self::parse_json(response, endpoint).await
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(
        &self,
        endpoint: &str,
        body: &B,
        auth_token: Option<&str>,
    ) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        info!("POSTリクエスト送信: endpoint={endpoint}");

        let request = Self::with_auth(self.client.post(self.url(endpoint)).json(body), auth_token);
        let response = self
            .send_request_with_retry(request, Method::POST, endpoint)
            .await?;
        Self::parse_json(response, endpoint).await
    }

    /// DELETEリクエストを送信
    ///
    /// レスポンスボディ（204の場合は空）は読み捨てる
    pub async fn delete(&self, endpoint: &str, auth_token: Option<&str>) -> AppResult<()> {
        info!("DELETEリクエスト送信: endpoint={endpoint}");

        let request = Self::with_auth(self.client.delete(self.url(endpoint)), auth_token);
        self.send_request_with_retry(request, Method::DELETE, endpoint)
            .await?;
        Ok(())
    }

    async fn parse_json<T>(response: Response, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        response.json().await.map_err(|e| {
            warn!("レスポンス解析エラー: endpoint={endpoint}, error={e}");
            AppError::InvalidResponse(format!("{endpoint}: {e}"))
        })
    }

    /// リトライ機能付きでリクエストを送信
    ///
    /// GETの通信失敗のみ指数バックオフでリトライする。POST/DELETEは
    /// サーバーに届いた後に切断された可能性があるため、一度だけ送信する。
    /// サーバーが応答した場合はステータスに応じて即座に分類して返す。
    async fn send_request_with_retry(
        &self,
        request: RequestBuilder,
        method: Method,
        endpoint: &str,
    ) -> AppResult<Response> {
        let max_retries = if method == Method::GET {
            self.config.max_retries
        } else {
            0
        };
        let mut attempts = 0;
        loop {
            let cloned_request = request.try_clone().ok_or_else(|| {
                AppError::transient("リクエストのクローンに失敗しました".to_string())
            })?;

            match cloned_request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        info!("{method}リクエスト成功: endpoint={endpoint}");
                        return Ok(response);
                    }
                    return Err(self.handle_error_response(response, method, endpoint).await);
                }
                Err(e) => {
                    if attempts < max_retries {
                        attempts += 1;
                        let delay = retry_delay(attempts);
                        warn!(
                            "APIリクエスト失敗、リトライします: attempt={attempts}/{max_retries}, delay={delay:?}, error={e}"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    warn!("{method}リクエスト失敗: endpoint={endpoint}, error={e}");
                    return Err(AppError::transient(format!(
                        "APIサーバーへの接続に失敗しました: {e}"
                    )));
                }
            }
        }
    }

    /// エラーレスポンスを処理し、エラー種別に変換する
    async fn handle_error_response(
        &self,
        response: Response,
        method: Method,
        endpoint: &str,
    ) -> AppError {
        let status = response.status();
        let response_text = response.text().await.unwrap_or_default();

        let error_response = match serde_json::from_str::<ErrorResponse>(&response_text) {
            Ok(parsed) => {
                debug!(
                    "APIサーバーからエラーレスポンスを受信: status={status}, message={:?}",
                    parsed.message
                );
                parsed
            }
            Err(_) => {
                warn!(
                    "APIサーバーから非構造化エラーレスポンス: status={status}, body={response_text}"
                );
                ErrorResponse::default()
            }
        };

        let error = classify_error_status(status, &error_response);
        warn!("{method}リクエスト失敗: endpoint={endpoint}, error={error}");
        error
    }
}

/// クエリ文字列付きのエンドポイントを組み立てる
///
/// 値はURLエンコードする（カテゴリ名に`&`や空白が含まれるため）
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}
