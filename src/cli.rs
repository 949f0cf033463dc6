use crate::MODEL_FILENAME;
use crate::model::ModelConfig;
use crate::output::{WriteMode, default_output_path};
use clap::Parser;
use std::path::PathBuf;

/// clapでコマンドラインの構造を定義します。
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run one forward pass of a trained PINN checkpoint and write the scalar result",
    long_about = None,
    allow_negative_numbers = true
)]
pub struct Cli {
    /// モデルに与えるスカラー入力（10進数）
    pub input: String,

    /// 学習済みモデルのチェックポイント
    #[arg(short, long, env = "PINN_MODEL_PATH", default_value = MODEL_FILENAME)]
    pub model: PathBuf,

    /// 予測値の書き込み先（省略時は一時ディレクトリの共有パス）
    #[arg(short, long, env = "PINN_OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// 出力ファイルの書き込み方法
    #[arg(long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub write_mode: WriteMode,

    /// 隠れ層のユニット数
    #[arg(long, default_value_t = 20)]
    pub hidden_size: usize,

    /// 線形層の総数
    #[arg(long, default_value_t = 4)]
    pub num_layers: usize,

    /// 予測値を標準出力にも表示します
    #[arg(long)]
    pub print: bool,

    /// ロード完了などの情報を表示します
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new()
            .with_n_hidden(self.hidden_size)
            .with_n_layers(self.num_layers)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(default_output_path)
    }
}
