use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchImageError {
    /// 共通ライブラリのエラー（入力検証など）
    #[error(transparent)]
    Common(#[from] imagegen_common::Error),

    #[error("APIキーが設定されていません。`--api-key` または環境変数 GEMINI_API_KEY で指定してください")]
    MissingApiKey,

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("既に生成中です")]
    AlreadyRunning,

    #[error("バッチ実行タスクが異常終了しました: {0}")]
    TaskFailed(String),

    #[error("生成中にエラーが発生しました: {0}")]
    BatchFailed(String),

    #[error("{0}")]
    Provider(String),

    #[error("no image in response")]
    NoImage,

    #[error("画像デコードエラー: {0}")]
    Decode(String),

    #[error("保存できる画像がありません")]
    EmptyResult,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("ZIP作成エラー: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchImageError {
    /// バッチ開始前の入力検証エラーかどうか
    pub fn is_validation(&self) -> bool {
        matches!(self, BatchImageError::Common(e) if e.is_validation())
    }
}

pub type Result<T> = std::result::Result<T, BatchImageError>;
