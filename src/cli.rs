use clap::{Parser, Subcommand};
use imagegen_common::Resolution;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gemini-batch")]
#[command(about = "プロンプト一覧からGemini画像を一括生成しZIPにまとめるツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// プロンプトファイルから画像を一括生成
    Generate {
        /// プロンプトファイル（1行1プロンプト、`-` で標準入力）
        #[arg(short, long, required = true)]
        prompts: PathBuf,

        /// 全画像に共通で付けるスタイル
        #[arg(short, long, default_value = "")]
        style: String,

        /// 解像度 (1K/2K/4K、省略時は設定値)
        #[arg(short, long)]
        resolution: Option<Resolution>,

        /// ZIPとsummary.jsonの出力先フォルダ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 画像の保存先（省略時は一時フォルダ、終了時に削除）
        #[arg(long)]
        images_dir: Option<PathBuf>,

        /// Gemini APIキー（省略時は環境変数 GEMINI_API_KEY）
        #[arg(long)]
        api_key: Option<String>,

        /// リクエスト間の待機秒数（省略時は設定値）
        #[arg(long)]
        delay: Option<u64>,
    },

    /// 生成済みフォルダの NNN.png をZIPにまとめる
    Archive {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力ファイル/ディレクトリ（省略時は画像フォルダ内）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// リクエスト間の待機秒数を設定
        #[arg(long)]
        set_delay: Option<u64>,

        /// デフォルト解像度を設定
        #[arg(long)]
        set_resolution: Option<Resolution>,
    },
}
