use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "energy-audit")]
#[command(about = "省エネ診断ドラフト管理・診断書PDF生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// ドラフト保存ディレクトリ（デフォルト: ~/.config/energy-audit）
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 保存中のドラフトの概要を表示
    Show,

    /// スナップショットJSONをドラフトとして取り込み
    Import {
        /// 入力JSONファイル（AuditRecord形式）
        #[arg(required = true)]
        input: PathBuf,
    },

    /// ドラフトから診断書PDFを生成
    Export {
        /// 出力ディレクトリ（デフォルト: カレントディレクトリ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ドラフトを破棄
    Clear {
        /// 確認プロンプトをスキップ
        #[arg(short = 'y', long)]
        yes: bool,
    },
}
