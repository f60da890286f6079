//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// アプリケーション統一エラー型
///
/// ゲート crate と API バイナリで共通に使う標準エラー型です。
/// クライアントはメッセージ文言ではなく `code` でエラーを判別します。
///
/// ## Fields
/// * `kind` - エラーの分類（HTTP ステータスコードにマッピング）
/// * `message` - ユーザー向けのエラーメッセージ
/// * `code` - 機械可読なエラーコード（未設定なら `kind` から導出）
/// * `source` - 元のエラー（オプション、デバッグ用）
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::BadRequest, "No image file provided")
///     .with_code("NO_IMAGE");
/// assert_eq!(err.code(), "NO_IMAGE");
///
/// let err = AppError::not_found("Route not found");
/// assert_eq!(err.code(), "NOT_FOUND");
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    code: Option<Cow<'static, str>>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// アプリケーション結果型エイリアス
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 新しいエラーを作成
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// 404 Not Found エラー（API のフォールバック用）
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// 機械可読なエラーコードを設定
    #[inline]
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// 元のエラーを設定（デバッグ用）
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// エラー種別を取得
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP ステータスコードを取得
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// メッセージを取得
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// エラーコードを取得（未設定なら種別のコード）
    #[inline]
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or(self.kind.as_code())
    }

    /// サーバーエラーかどうか
    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        builder.field("code", &self.code());
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.kind, self.message, self.code())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_error() {
        let err = AppError::new(ErrorKind::Forbidden, "Image rejected");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Image rejected");
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::not_found("Route not found");
        assert_eq!(err.status_code(), 404);
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_with_code_overrides_kind_code() {
        let err =
            AppError::new(ErrorKind::BadRequest, "No image file provided").with_code("NO_IMAGE");
        assert_eq!(err.code(), "NO_IMAGE");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_with_source() {
        let io_err = std::io::Error::other("stream reset");
        let err = AppError::new(ErrorKind::InternalServerError, "Failed to validate image")
            .with_source(io_err);
        assert!(err.is_server_error());
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("stream reset"));
    }

    #[test]
    fn test_display() {
        let err = AppError::not_found("Route not found");
        assert_eq!(err.to_string(), "[Not Found] Route not found (NOT_FOUND)");
    }
}
